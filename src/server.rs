use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument};

use crate::commands::executable::Executable;
use crate::commands::{Command, CommandType};
use crate::connection::Connection;
use crate::error::ServiceError;
use crate::frame::{Frame, Request, Response};
use crate::store::Store;
use crate::streamer::Streamer;
use crate::Error;

/// Runtime settings for one server instance.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub stream_port: u16,
    pub accounts_file: PathBuf,
    pub songs_dir: PathBuf,
    pub playlists_dir: PathBuf,
    pub stream_workers: usize,
}

pub async fn run(config: Config) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let store = Store::open(
        &config.accounts_file,
        &config.songs_dir,
        &config.playlists_dir,
    )?;
    let streamer = Streamer::start(config.stream_port, config.stream_workers).await?;
    let listener = TcpListener::bind(("127.0.0.1", config.port)).await?;

    info!("Command server listening on {}", listener.local_addr()?);

    loop {
        let (socket, client_address) = listener.accept().await?;
        let store = store.clone();
        let streamer = streamer.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, client_address, store, streamer).await {
                error!("{}", e);
            }
        });
    }
}

#[instrument(
    name = "connection",
    skip(stream, store, streamer),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    store: Store,
    streamer: Streamer,
) -> Result<(), Error> {
    let mut conn = Connection::new(stream);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    while let Some(frame) = conn.read_frame().await? {
        let request = match frame {
            Frame::Request(request) => request,
            Frame::Response(_) => return Err("protocol error; expected a request frame".into()),
        };
        debug!("Received request: {:?}", request);

        let frame = Frame::Response(dispatch(request, &store).await?);
        conn.write_frame(&frame).await?;

        // The client opens its audio side connection only after it has seen
        // the PLAY response, so the streaming worker is armed afterwards.
        if let Frame::Response(Response {
            song: Some(song), ..
        }) = frame
        {
            streamer.submit(song.path).await?;
        }
    }

    info!("Connection closed");
    Ok(())
}

/// Parses and executes one command line. Recoverable failures become ERROR
/// responses; server-side faults bubble up to drop the connection.
async fn dispatch(request: Request, store: &Store) -> Result<Response, Error> {
    let command = match Command::parse(&request.line) {
        Ok(command) => command,
        Err(err) if err.is_client_error() => return Ok(error_response(&err)),
        Err(err) => return Err(err.into()),
    };

    // Command execution touches the filesystem, so it runs off the reactor.
    let store = store.clone();
    let result = tokio::task::spawn_blocking(move || command.exec(&request.email, store)).await?;

    match result {
        Ok(response) => Ok(response),
        Err(err) if err.is_client_error() => Ok(error_response(&err)),
        Err(err) => Err(err.into()),
    }
}

fn error_response(err: &ServiceError) -> Response {
    Response::new(CommandType::Error, format!("There was an error!\n{}", err))
}
