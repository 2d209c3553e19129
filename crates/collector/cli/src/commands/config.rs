//! Show the resolved configuration

use crate::error::CliResult;
use crate::output::{emit, heading, row, OutputFormat};
use crate::settings::CliConfig;

pub fn show(config: &CliConfig, format: OutputFormat) -> CliResult<()> {
    emit(format, config, |c| {
        heading("Collector Configuration");
        row("Name", &c.engine.name);
        row("Chain id", c.engine.chain_id);
        row("Engine address", c.engine_address);
        row("Join stake", c.engine.join_stake);
        row("Voting period", format!("{}s", c.engine.voting_period_secs));
        row(
            "Quorum",
            format!("{}/{}", c.engine.quorum.numerator, c.engine.quorum.denominator),
        );
        row("Members-only relay", c.engine.members_only_relay);
        row("Log level", &c.logging.level);
        row("JSON logs", c.logging.json);
    })
}
