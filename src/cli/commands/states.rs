//! States command - List the driving states the agent can encounter

use anyhow::Result;
use clap::Parser;

use crate::q_learning::{DrivingState, STATE_COUNT};

#[derive(Parser, Debug)]
#[command(name = "states", about = "List every encodable driving state")]
pub struct StatesArgs {
    /// Print only the number of states
    #[arg(long, default_value_t = false)]
    pub count: bool,
}

pub fn execute(args: StatesArgs) -> Result<()> {
    if args.count {
        println!("{STATE_COUNT}");
        return Ok(());
    }

    println!("# waypoint|light|left|right|oncoming");
    for state in DrivingState::all() {
        println!("{state}");
    }
    Ok(())
}
