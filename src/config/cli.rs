use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "lead-intake")]
#[command(about = "Lead intake API: stores quote requests and emails the customer and sales team")]
pub struct ServerArgs {
    /// TOML configuration file; environment variables are used when omitted
    #[arg(short, long, env = "LEAD_INTAKE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listening port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Keep leads in process memory instead of Supabase (local development)
    #[arg(long)]
    pub in_memory: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_args() {
        let args = ServerArgs::parse_from([
            "lead-intake",
            "--config",
            "leads.toml",
            "--port",
            "8080",
            "--in-memory",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("leads.toml")));
        assert_eq!(args.port, Some(8080));
        assert!(args.in_memory);
        assert!(!args.verbose);
    }
}
