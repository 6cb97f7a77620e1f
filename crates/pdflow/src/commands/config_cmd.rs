//! `pdflow config` handlers: locate, show and initialise profiles.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

/// Copy of `cfg` with plaintext API keys masked.
fn redacted(cfg: &Config) -> Config {
    Config {
        default_profile: cfg.default_profile.clone(),
        defaults: pdflow_config::Defaults {
            output: cfg.defaults.output.clone(),
            insecure: cfg.defaults.insecure,
            timeout: cfg.defaults.timeout,
        },
        profiles: cfg
            .profiles
            .iter()
            .map(|(name, p)| {
                (
                    name.clone(),
                    Profile {
                        api_url: p.api_url.clone(),
                        api_key: p.api_key.as_ref().map(|_| REDACTED.to_owned()),
                        api_key_env: p.api_key_env.clone(),
                        ca_cert: p.ca_cert.clone(),
                        insecure: p.insecure,
                        timeout: p.timeout,
                    },
                )
            })
            .collect(),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let rendered = toml::to_string_pretty(&redacted(&cfg))
                .map_err(|e| CliError::Output(e.to_string()))?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        ConfigCommand::Init {
            url,
            key,
            key_env,
            set_default,
        } => {
            if let Some(ref raw) = url {
                raw.parse::<url::Url>().map_err(|_| CliError::Validation {
                    field: "url".into(),
                    reason: format!("invalid URL: {raw}"),
                })?;
            }

            let mut cfg = config::load_config_or_default();
            let name = config::active_profile_name(global, &cfg);
            let profile = Profile {
                api_url: url,
                api_key: key,
                api_key_env: key_env,
                ..Profile::default()
            };
            cfg.profiles.insert(name.clone(), profile);
            if set_default || cfg.profiles.len() == 1 {
                cfg.default_profile = Some(name.clone());
            }

            let path = config::save_config(&cfg)?;
            output::print_status(
                &format!("Profile '{name}' written to {}", path.display()),
                global.quiet,
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_masks_plaintext_keys() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                api_key: Some("u+secret".into()),
                api_key_env: Some("PD_KEY".into()),
                ..Profile::default()
            },
        );

        let masked = redacted(&cfg);
        let profile = &masked.profiles["default"];

        assert_eq!(profile.api_key.as_deref(), Some(REDACTED));
        assert_eq!(profile.api_key_env.as_deref(), Some("PD_KEY"));
    }
}
