#[cfg(test)]
mod cli_help_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Binary pointed at a throwaway configuration directory so the tests
    /// never read or write the real user configuration.
    fn nimbuscli(config_dir: &TempDir) -> Command {
        let mut cmd = Command::cargo_bin("nimbuscli").unwrap();
        cmd.env("NIMBUSCLI_CONFIG_DIR", config_dir.path());
        cmd.env_remove("NIMBUSCLI_API_KEY");
        cmd.env_remove("NIMBUSCLI_ACCESS_TOKEN");
        cmd.env_remove("NIMBUSCLI_REFRESH_TOKEN");
        cmd
    }

    #[test]
    fn test_cli_help_output() {
        let config_dir = TempDir::new().unwrap();
        let assert_result = nimbuscli(&config_dir).arg("--help").assert().success();
        let output = assert_result.get_output();
        let help_output = String::from_utf8_lossy(&output.stdout);

        assert!(help_output.contains("Usage:"));
        assert!(help_output.contains("Options:"));
        assert!(help_output.contains("Commands:"));

        // All resource command groups are present.
        assert!(help_output.contains("instance"));
        assert!(help_output.contains("volume"));
        assert!(help_output.contains("ai"));
        assert!(help_output.contains("baremetal"));
        assert!(help_output.contains("k8s"));
        assert!(help_output.contains("server-group"));
        assert!(help_output.contains("task"));
        assert!(help_output.contains("config"));

        // Global flags.
        assert!(help_output.contains("--format"));
        assert!(help_output.contains("--wait"));
        assert!(help_output.contains("--debug"));
        assert!(help_output.contains("-h, --help"));
        assert!(help_output.contains("-V, --version"));
    }

    #[test]
    fn test_cli_version_output() {
        let config_dir = TempDir::new().unwrap();
        let assert_result = nimbuscli(&config_dir).arg("--version").assert().success();
        let output = assert_result.get_output();
        let version_output = String::from_utf8_lossy(&output.stdout);

        assert!(version_output.contains("nimbuscli"));
        assert!(version_output.contains('.'));
    }

    #[test]
    fn test_cli_subcommand_help_outputs() {
        let expectations = vec![
            (
                "instance",
                vec![
                    "list",
                    "get",
                    "create",
                    "delete",
                    "resize",
                    "start",
                    "stop",
                    "interfaces",
                    "console",
                ],
            ),
            (
                "volume",
                vec![
                    "list", "get", "create", "delete", "attach", "detach", "extend", "retype",
                ],
            ),
            ("ai", vec!["list", "get", "create", "delete", "resize"]),
            (
                "baremetal",
                vec!["list", "get", "create", "rebuild", "flavors"],
            ),
            (
                "k8s",
                vec![
                    "list",
                    "get",
                    "create",
                    "delete",
                    "pools",
                    "pool-resize",
                    "kubeconfig",
                    "certificates",
                ],
            ),
            ("server-group", vec!["list", "get", "create", "delete"]),
            ("task", vec!["get", "active", "wait"]),
            ("config", vec!["show", "path", "set"]),
        ];

        for (subcommand, nested) in expectations {
            let config_dir = TempDir::new().unwrap();
            let assert_result = nimbuscli(&config_dir)
                .arg(subcommand)
                .arg("--help")
                .assert()
                .success();
            let output = assert_result.get_output();
            let help_output = String::from_utf8_lossy(&output.stdout);

            assert!(
                help_output.contains("Usage:"),
                "{} help lacks usage",
                subcommand
            );
            for nested_command in nested {
                assert!(
                    help_output.contains(nested_command),
                    "{} help lacks {}",
                    subcommand,
                    nested_command
                );
            }
        }
    }

    #[test]
    fn test_nested_subcommand_help() {
        let nested_commands = vec![
            ("instance", "create"),
            ("instance", "console"),
            ("volume", "attach"),
            ("volume", "extend"),
            ("ai", "resize"),
            ("baremetal", "rebuild"),
            ("k8s", "pool-resize"),
            ("k8s", "kubeconfig"),
            ("server-group", "create"),
            ("task", "wait"),
            ("config", "set"),
        ];

        for (parent_cmd, sub_cmd) in nested_commands {
            let config_dir = TempDir::new().unwrap();
            let assert_result = nimbuscli(&config_dir)
                .arg(parent_cmd)
                .arg(sub_cmd)
                .arg("--help")
                .assert()
                .success();
            let output = assert_result.get_output();
            let help_output = String::from_utf8_lossy(&output.stdout);

            assert!(help_output.contains("Usage:"));
            assert!(help_output.contains(parent_cmd));
            assert!(help_output.contains(sub_cmd));
        }
    }

    #[test]
    fn test_bare_invocation_asks_for_a_command() {
        let config_dir = TempDir::new().unwrap();
        nimbuscli(&config_dir)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Usage:"));
    }

    #[test]
    fn test_invalid_format_value_is_rejected() {
        let config_dir = TempDir::new().unwrap();
        nimbuscli(&config_dir)
            .arg("instance")
            .arg("list")
            .arg("--format")
            .arg("xml")
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid value"));
    }
}
