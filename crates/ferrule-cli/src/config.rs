use anyhow::bail;
use clap::{Parser, Subcommand};
use ferrule::{
    AllocatorConfig, DATACENTER_ID_ENV, DEFAULT_EPOCH_MS, EPOCH_ENV, IdAllocator, SystemClock,
    WORKER_ID_ENV,
};

/// Runtime configuration for the `ferrule` binary.
///
/// Coordinates are read from CLI arguments or the same environment variables
/// the library's process allocator uses, so a shell that exports
/// `SNOWFLAKE_WORKER_ID` gets IDs from the same namespace as its services.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ferrule",
    version,
    about = "Issue and decode Snowflake primary keys"
)]
pub struct CliArgs {
    /// Worker coordinate encoded in every issued ID (0..=31).
    ///
    /// Environment variable: `SNOWFLAKE_WORKER_ID`
    #[arg(long, env = WORKER_ID_ENV, default_value_t = ferrule::DEFAULT_WORKER_ID, allow_negative_numbers = true)]
    pub worker_id: i64,

    /// Datacenter coordinate encoded in every issued ID (0..=31).
    ///
    /// Environment variable: `SNOWFLAKE_DATACENTER_ID`
    #[arg(long, env = DATACENTER_ID_ENV, default_value_t = ferrule::DEFAULT_DATACENTER_ID, allow_negative_numbers = true)]
    pub datacenter_id: i64,

    /// Epoch, in Unix milliseconds, timestamps are counted from.
    ///
    /// Must match every other allocator sharing the ID namespace.
    ///
    /// Environment variable: `SNOWFLAKE_EPOCH_MS`
    #[arg(long, env = EPOCH_ENV, default_value_t = DEFAULT_EPOCH_MS)]
    pub epoch_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Issue new IDs, one per line on stdout.
    Generate {
        /// Number of IDs to issue.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Number of threads sharing the allocator.
        #[arg(short, long, default_value_t = 1)]
        threads: usize,

        /// Zero-pad every ID to 19 digits.
        #[arg(short, long, default_value_t = false)]
        padded: bool,
    },
    /// Print the fields packed into existing IDs as JSON.
    Decode {
        /// Decimal IDs to decode.
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Debug)]
pub struct CliConfig {
    pub allocator: IdAllocator<SystemClock>,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if let Command::Generate { count, threads, .. } = args.command {
            if count == 0 {
                bail!("--count must be greater than 0");
            }
            if threads == 0 {
                bail!("--threads must be greater than 0");
            }
            if threads > count {
                bail!("--threads ({threads}) exceeds --count ({count})");
            }
        }

        let config = AllocatorConfig {
            worker_id: args.worker_id,
            datacenter_id: args.datacenter_id,
            epoch_ms: args.epoch_ms,
        };

        Ok(Self {
            allocator: IdAllocator::from_config(&config, SystemClock)?,
            command: args.command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<CliConfig> {
        let args = CliArgs::try_parse_from(
            ["ferrule", "--worker-id", "3", "--datacenter-id", "7", "--epoch-ms", "1704067200000"]
                .iter()
                .chain(args),
        )?;
        CliConfig::try_from(args)
    }

    #[test]
    fn generate_defaults() {
        let config = parse(&["generate"]).unwrap();
        assert_eq!(config.allocator.worker_id(), 3);
        assert_eq!(config.allocator.datacenter_id(), 7);
        assert_eq!(config.allocator.epoch_ms(), DEFAULT_EPOCH_MS);
        assert_eq!(
            config.command,
            Command::Generate {
                count: 1,
                threads: 1,
                padded: false
            }
        );
    }

    #[test]
    fn generate_flags() {
        let config = parse(&["generate", "-n", "100", "--threads", "4", "--padded"]).unwrap();
        assert_eq!(
            config.command,
            Command::Generate {
                count: 100,
                threads: 4,
                padded: true
            }
        );
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let args =
            CliArgs::try_parse_from(["ferrule", "--worker-id", "32", "--datacenter-id", "0", "generate"])
                .unwrap();
        let err = CliConfig::try_from(args).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ferrule::Error>(),
            Some(&ferrule::Error::Configuration {
                field: "worker_id",
                value: 32,
                max: 31,
            })
        );

        let args =
            CliArgs::try_parse_from(["ferrule", "--worker-id", "0", "--datacenter-id", "-1", "generate"])
                .unwrap();
        let err = CliConfig::try_from(args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ferrule::Error>(),
            Some(ferrule::Error::Configuration {
                field: "datacenter_id",
                value: -1,
                ..
            })
        ));

        let args =
            CliArgs::try_parse_from(["ferrule", "--worker-id", "31", "--datacenter-id", "0", "generate"])
                .unwrap();
        assert!(CliConfig::try_from(args).is_ok());
    }

    #[test]
    fn rejects_bad_thread_counts() {
        assert!(parse(&["generate", "--threads", "0"]).is_err());
        assert!(parse(&["generate", "-n", "2", "--threads", "3"]).is_err());
    }

    #[test]
    fn decode_requires_an_id() {
        assert!(parse(&["decode"]).is_err());
        let config = parse(&["decode", "1", "2"]).unwrap();
        assert_eq!(
            config.command,
            Command::Decode {
                ids: vec!["1".into(), "2".into()]
            }
        );
    }
}
