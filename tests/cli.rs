#[cfg(test)]
mod cli_tests {
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::process::{Command, Output, Stdio};

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn rox() -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_rox"));
        cmd.env_remove("RUST_LOG");
        cmd
    }

    fn script(dir: &TempDir, name: &str, source: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, source).expect("write script");
        path
    }

    fn run(args: &[&Path]) -> Output {
        rox().args(args).output().expect("spawn rox")
    }

    fn stdout(output: &Output) -> String {
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn stderr(output: &Output) -> String {
        String::from_utf8_lossy(&output.stderr).into_owned()
    }

    #[test]
    fn test_runs_script() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = script(&dir, "ok.lox", "print 1 + 2 * 3;\nprint \"done\";\n");

        let output = run(&[&path]);

        assert_eq!(output.status.code(), Some(0));
        assert_eq!(stdout(&output), "7\ndone\n");
        assert_eq!(stderr(&output), "");
    }

    #[test]
    fn test_syntax_error_exits_65_without_running() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = script(&dir, "bad.lox", "print \"before\";\nvar = 1;\n");

        let output = run(&[&path]);

        assert_eq!(output.status.code(), Some(65));
        assert_eq!(stdout(&output), "");
        assert_eq!(stderr(&output), "[line 2] Error at '=': Expect variable name.\n");
    }

    #[test]
    fn test_resolver_error_exits_65() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = script(&dir, "ret.lox", "return 1;\n");

        let output = run(&[&path]);

        assert_eq!(output.status.code(), Some(65));
        assert_eq!(
            stderr(&output),
            "[line 1] Error at 'return': Can't return from top-level code.\n"
        );
    }

    #[test]
    fn test_runtime_error_exits_70() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = script(&dir, "rt.lox", "print 1;\nprint missing;\nprint 2;\n");

        let output = run(&[&path]);

        assert_eq!(output.status.code(), Some(70));
        assert_eq!(stdout(&output), "1\n");
        assert_eq!(stderr(&output), "Undefined variable 'missing'.\n[line 2]\n");
    }

    #[test]
    fn test_too_many_scripts_is_a_usage_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = script(&dir, "a.lox", "");
        let b = script(&dir, "b.lox", "");

        let output = run(&[&a, &b]);

        assert_eq!(output.status.code(), Some(64));
        assert_eq!(stdout(&output), "Usage: rox [script]\n");
    }

    #[test]
    fn test_unknown_flag_is_a_usage_error() {
        let output = rox().arg("--bogus").output().expect("spawn rox");

        assert_eq!(output.status.code(), Some(64));
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = tempfile::tempdir().expect("tempdir");

        let output = run(&[&dir.path().join("absent.lox")]);

        assert!(!output.status.success());
        assert!(stderr(&output).contains("Failed to open file"));
    }

    #[test]
    fn test_prompt_keeps_going_after_errors() {
        let mut child = rox()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn rox");

        child
            .stdin
            .take()
            .expect("stdin")
            .write_all(b"var a = 1;\nprint a;\nprint b;\nprint a + 1;\n")
            .expect("write stdin");

        let output = child.wait_with_output().expect("wait rox");

        assert_eq!(output.status.code(), Some(0));
        assert_eq!(stdout(&output), "> > 1\n> > 2\n> ");
        assert_eq!(stderr(&output), "Undefined variable 'b'.\n[line 1]\n");
    }

    #[test]
    fn test_tokenize() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = script(&dir, "t.lox", "var x = 3;\n");

        let output = rox().arg("tokenize").arg(&path).output().expect("spawn rox");

        assert_eq!(output.status.code(), Some(0));
        assert_eq!(
            stdout(&output),
            "VAR var null\nIDENTIFIER x null\nEQUAL = null\nNUMBER 3 3.0\nSEMICOLON ; null\nEOF  null\n"
        );
    }

    #[test]
    fn test_tokenize_reports_lexical_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = script(&dir, "t.lox", "(#)");

        let output = rox().arg("tokenize").arg(&path).output().expect("spawn rox");

        assert_eq!(output.status.code(), Some(65));
        assert_eq!(stdout(&output), "LEFT_PAREN ( null\nRIGHT_PAREN ) null\nEOF  null\n");
        assert_eq!(stderr(&output), "[line 1] Error: Unexpected character.\n");
    }

    #[test]
    fn test_tokenize_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = script(&dir, "t.lox", "print;");

        let output = rox()
            .args(["tokenize", "--json"])
            .arg(&path)
            .output()
            .expect("spawn rox");

        let tokens: Vec<serde_json::Value> = stdout(&output)
            .lines()
            .map(|line| serde_json::from_str(line).expect("json token"))
            .collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0]["token_type"], "PRINT");
        assert_eq!(tokens[0]["lexeme"], "print");
        assert_eq!(tokens[0]["line"], 1);
        assert_eq!(tokens[2]["token_type"], "EOF");
    }

    #[test]
    fn test_parse() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = script(&dir, "p.lox", "print 1 + 2;\nvar a = -b;\n");

        let output = rox().arg("parse").arg(&path).output().expect("spawn rox");

        assert_eq!(output.status.code(), Some(0));
        assert_eq!(stdout(&output), "(print (+ 1.0 2.0))\n(var a (- b))\n");
    }

    #[test]
    fn test_evaluate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ok = script(&dir, "ok.lox", "(1 + 2) * 3");
        let bad = script(&dir, "bad.lox", "-\"x\"");

        let output = rox().arg("evaluate").arg(&ok).output().expect("spawn rox");
        assert_eq!(output.status.code(), Some(0));
        assert_eq!(stdout(&output), "9\n");

        let output = rox().arg("evaluate").arg(&bad).output().expect("spawn rox");
        assert_eq!(output.status.code(), Some(70));
        assert_eq!(stderr(&output), "Operand must be a number.\n[line 1]\n");

        let this = script(&dir, "this.lox", "this");
        let output = rox().arg("evaluate").arg(&this).output().expect("spawn rox");
        assert_eq!(output.status.code(), Some(65));
        assert_eq!(stdout(&output), "");
        assert_eq!(
            stderr(&output),
            "[line 1] Error at 'this': Can't use 'this' outside of a class.\n"
        );
    }

    #[test]
    fn test_runaway_recursion_exits_70() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = script(
            &dir,
            "deep.lox",
            "fun c(n) { if (n > 0) return c(n - 1); return 0; }\nprint c(1000);\nprint c(100000);\n",
        );

        let output = run(&[&path]);

        assert_eq!(output.status.code(), Some(70));
        assert_eq!(stdout(&output), "0\n");
        assert_eq!(stderr(&output), "Stack overflow.\n[line 1]\n");
    }

    #[test]
    fn test_script_must_be_utf8() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("latin1.lox");
        fs::write(&path, b"print \"caf\xe9\";").expect("write script");

        let output = run(&[&path]);

        assert!(!output.status.success());
        assert!(stderr(&output).contains("is not valid UTF-8"));
    }

    #[test]
    fn test_log_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = script(&dir, "ok.lox", "print 1;");
        let log = dir.path().join("trace.log");

        let output = rox()
            .arg(format!("--log={}", log.display()))
            .arg(&path)
            .output()
            .expect("spawn rox");

        assert_eq!(output.status.code(), Some(0));
        assert_eq!(stdout(&output), "1\n");

        let contents = fs::read_to_string(&log).expect("log file");
        assert!(contents.contains("Logger initialized"));
        assert!(contents.lines().all(|line| line.starts_with('[')));
    }
}
