use std::path::PathBuf;

use clap::Parser;
use mailvalid_lib::ValidationConfig;

#[derive(Parser)]
#[command(name = "mailvalid-cli", about = "Validate an email address.")]
pub struct Cli {
    /// adresse e-mail à valider
    pub email: Option<String>,

    /// lit des adresses depuis stdin (une par ligne)
    #[arg(long, conflicts_with = "email")]
    pub stdin: bool,

    /// affiche le résultat de chaque étape
    #[arg(short, long)]
    pub verbose: bool,

    /// saute la vérification DNS (et donc SMTP)
    #[arg(long)]
    pub no_dns: bool,

    /// saute la détection des fournisseurs jetables
    #[arg(long = "no-disposable-check")]
    pub no_disposable_check: bool,

    /// saute la vérification de la boîte via SMTP
    #[arg(long = "no-verify", visible_alias = "no-smtp")]
    pub no_verify: bool,

    /// un refus SMTP (550/551/553) invalide l'adresse
    #[arg(long, conflicts_with = "no_verify")]
    pub strict_smtp: bool,

    /// timeout SMTP (secondes)
    #[arg(long, default_value_t = 5)]
    pub smtp_timeout: u64,

    /// timeout DNS (secondes)
    #[arg(long, default_value_t = 5)]
    pub dns_timeout: u64,

    /// nom utilisé pour EHLO/HELO
    #[arg(long)]
    pub helo: Option<String>,

    /// enveloppe MAIL FROM
    #[arg(long = "mail-from")]
    pub mail_from: Option<String>,

    /// fichier de domaines jetables supplémentaires (un par ligne)
    #[arg(long = "disposable-list")]
    pub disposable_list: Option<PathBuf>,

    /// format: human|json
    #[arg(long, default_value = "human")]
    pub format: String,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    pub fn to_config(&self) -> ValidationConfig {
        let defaults = ValidationConfig::default();
        ValidationConfig {
            check_dns: !self.no_dns,
            check_disposable: !self.no_disposable_check,
            check_smtp: !self.no_dns && !self.no_verify,
            verbose: self.verbose,
            strict_smtp: self.strict_smtp,
            smtp_timeout_seconds: self.smtp_timeout,
            dns_timeout_seconds: self.dns_timeout,
            helo_domain: self.helo.clone().unwrap_or(defaults.helo_domain.clone()),
            mail_from: self.mail_from.clone().unwrap_or(defaults.mail_from.clone()),
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mailvalid-cli").chain(args.iter().copied()))
            .expect("valid args")
    }

    #[test]
    fn defaults_enable_every_check() {
        let cfg = parse(&["user@example.com"]).to_config();
        assert!(cfg.check_dns && cfg.check_disposable && cfg.check_smtp);
        assert!(!cfg.verbose);
    }

    #[test]
    fn no_dns_disables_smtp() {
        let cfg = parse(&["--no-dns", "user@example.com"]).to_config();
        assert!(!cfg.check_dns);
        assert!(!cfg.check_smtp);
    }

    #[test]
    fn no_smtp_alias() {
        let cfg = parse(&["--no-smtp", "--no-disposable-check", "-v", "a@b.cc"]).to_config();
        assert!(!cfg.check_smtp);
        assert!(!cfg.check_disposable);
        assert!(cfg.verbose);
    }

    #[test]
    fn strict_conflicts_with_no_verify() {
        let res = Cli::try_parse_from(["mailvalid-cli", "--strict-smtp", "--no-verify", "a@b.cc"]);
        assert!(res.is_err());
    }
}
