use std::{path::PathBuf, process::exit};

use bindb::ListStore;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// File holding the list of values
    #[arg(short, long, default_value = "store.bindb")]
    file: PathBuf,

    /// Fsync the file after every write
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    List,
    Add {
        #[arg(required = true)]
        values: Vec<String>,
    },

    #[clap(name = "rm")]
    Remove {
        #[arg(required = true)]
        values: Vec<String>,
    },

    Clear,
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("{}", err);
        exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ListStore::<String>::builder()
        .set_sync_mode(args.sync)
        .open_list::<String>(&args.file)?;

    match args.command {
        Commands::List => {
            for value in store.list() {
                println!("{}", value);
            }
        }
        Commands::Add { values } => store.add(values)?,
        Commands::Remove { values } => store.delete(&values)?,
        Commands::Clear => store.delete_all()?,
    }
    Ok(())
}
