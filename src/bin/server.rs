use std::path::PathBuf;

use clap::Parser;
use rustify::server::{self, Config};
use rustify::Error;

const PORT: u16 = 44_444;
const STREAM_PORT: u16 = 44_445;
const STREAM_WORKERS: usize = 10;

#[derive(Parser, Debug)]
struct Args {
    /// The port to listen on for command connections
    #[arg(short, long, default_value_t = PORT)]
    port: u16,

    /// The port audio streams are served from
    #[arg(long, default_value_t = STREAM_PORT)]
    stream_port: u16,

    /// File holding one "email password" line per registered account
    #[arg(long, env = "RUSTIFY_ACCOUNTS_FILE", default_value = "Accounts/Accounts.txt")]
    accounts_file: PathBuf,

    /// Directory holding the song catalog
    #[arg(long, env = "RUSTIFY_SONGS_DIR", default_value = "Music")]
    songs_dir: PathBuf,

    /// Directory holding one file per playlist
    #[arg(long, env = "RUSTIFY_PLAYLISTS_DIR", default_value = "Playlists")]
    playlists_dir: PathBuf,

    /// How many songs can stream at the same time
    #[arg(long, default_value_t = STREAM_WORKERS)]
    stream_workers: usize,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    server::run(Config {
        port: args.port,
        stream_port: args.stream_port,
        accounts_file: args.accounts_file,
        songs_dir: args.songs_dir,
        playlists_dir: args.playlists_dir,
        stream_workers: args.stream_workers,
    })
    .await
}
