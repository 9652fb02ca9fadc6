#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::*;
    use crate::env::InMemoryEnv;

    #[test]
    fn test_default_gate_section() {
        let gate = GateSection::default();
        assert_eq!(gate.greeting_threshold, 3);
        assert_eq!(gate.trigger_cooldown_secs, 10);

        let config = gate.to_gate_config();
        assert_eq!(config.trigger_cooldown, Duration::from_secs(10));
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [telegram]
            bot_token = "123:abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.telegram.bot_token, "123:abc");
        assert!(!config.telegram.concurrent_updates);
        assert_eq!(config.gate, GateSection::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_toml() {
        let config = Config::from_toml_str(
            r#"
            [telegram]
            bot_token = "123:abc"
            concurrent_updates = true

            [gate]
            greeting_threshold = 7
            trigger_phrase = "dues"
            trigger_cooldown_secs = 30

            [messages]
            welcome = "hi"
            trigger_reply = "see homepage"
            rules = "<b>rules</b>"
            rules_preview_url = "https://example.org/rules.png"
            "#,
        )
        .unwrap();

        assert!(config.telegram.concurrent_updates);
        assert_eq!(config.gate.greeting_threshold, 7);
        assert_eq!(config.gate.trigger_phrase, "dues");
        assert_eq!(config.messages.welcome, "hi");
        assert_eq!(
            config.messages.rules_preview_url.as_deref(),
            Some("https://example.org/rules.png")
        );
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(Config::from_file("/nonexistent/telegram-greeter.toml").is_err());
    }

    #[test]
    fn test_from_env_requires_token() {
        let env = InMemoryEnv::new();
        assert!(matches!(
            Config::from_env(&env),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn test_from_env_falls_back_to_tg_token() {
        let env = InMemoryEnv::new();
        env.set("TG_TOKEN", "legacy:token");
        let config = Config::from_env(&env).unwrap();
        assert_eq!(config.telegram.bot_token, "legacy:token");
    }

    #[test]
    fn test_load_without_file_uses_cli_token() {
        let env = InMemoryEnv::new();
        env.set("GREETING_THRESHOLD", "4");

        let config =
            Config::load("/nonexistent/telegram-greeter.toml", Some("123:abc".into()), &env)
                .unwrap();

        assert_eq!(config.telegram.bot_token, "123:abc");
        assert_eq!(config.gate.greeting_threshold, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_cli_token_wins_over_env() {
        let env = InMemoryEnv::new();
        env.set("TELEGRAM_BOT_TOKEN", "env:token");

        let config =
            Config::load("/nonexistent/telegram-greeter.toml", Some("cli:token".into()), &env)
                .unwrap();
        assert_eq!(config.telegram.bot_token, "cli:token");

        let config = Config::load("/nonexistent/telegram-greeter.toml", None, &env).unwrap();
        assert_eq!(config.telegram.bot_token, "env:token");
    }

    #[test]
    fn test_load_without_any_token_fails() {
        let env = InMemoryEnv::new();
        assert!(Config::load("/nonexistent/telegram-greeter.toml", None, &env).is_err());
    }

    #[test]
    fn test_load_file_token_overridden_by_cli() {
        let path = std::env::temp_dir().join(format!(
            "telegram-greeter-load-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[telegram]\nbot_token = \"file:token\"\n\n[gate]\ngreeting_threshold = 9\n",
        )
        .unwrap();
        let path_str = path.to_str().unwrap();
        let env = InMemoryEnv::new();

        let from_file = Config::load(path_str, None, &env).unwrap();
        let overridden = Config::load(path_str, Some("cli:token".into()), &env).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(from_file.telegram.bot_token, "file:token");
        assert_eq!(from_file.gate.greeting_threshold, 9);
        assert_eq!(overridden.telegram.bot_token, "cli:token");
    }

    #[test]
    fn test_from_env_overrides() {
        let env = InMemoryEnv::new();
        env.set("TELEGRAM_BOT_TOKEN", "123:abc");
        env.set("GREETING_THRESHOLD", "5");
        env.set("TRIGGER_COOLDOWN_SECS", " 20 ");
        env.set("TRIGGER_PHRASE", "dues");
        env.set("CONCURRENT_UPDATES", "true");

        let config = Config::from_env(&env).unwrap();
        assert_eq!(config.gate.greeting_threshold, 5);
        assert_eq!(config.gate.trigger_cooldown_secs, 20);
        assert_eq!(config.gate.trigger_phrase, "dues");
        assert!(config.telegram.concurrent_updates);
    }

    #[test]
    fn test_from_env_rejects_bad_number() {
        let env = InMemoryEnv::new();
        env.set("TELEGRAM_BOT_TOKEN", "123:abc");
        env.set("GREETING_THRESHOLD", "three");

        match Config::from_env(&env) {
            Err(ConfigError::InvalidNumber { key, value }) => {
                assert_eq!(key, "GREETING_THRESHOLD");
                assert_eq!(value, "three");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_empty_token_and_texts() {
        let mut config = Config::from_toml_str("[telegram]\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::MissingToken)));

        config.telegram.bot_token = "123:abc".into();
        config.messages.welcome = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::Gate(_))));
    }
}
