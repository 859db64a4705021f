use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info};

use crate::Error;

/// Size of one audio chunk written to a side connection.
const CHUNK_SIZE: usize = 1024;

/// Jobs waiting for a free worker slot sit in this queue; once it fills up,
/// submitters wait for space instead of dropping the job.
const QUEUE_CAPACITY: usize = 32;

/// Delivers song bytes over a dedicated audio endpoint, one bounded worker
/// per play request. Cloning hands out another submit handle to the same
/// coordinator.
#[derive(Clone)]
pub struct Streamer {
    jobs: mpsc::Sender<StreamJob>,
    local_addr: SocketAddr,
}

#[derive(Debug)]
struct StreamJob {
    path: String,
}

impl Streamer {
    /// Binds the audio endpoint and spawns the coordinator with a pool of
    /// `workers` streaming slots.
    pub async fn start(port: u16, workers: usize) -> Result<Streamer, Error> {
        let listener = Arc::new(TcpListener::bind(("127.0.0.1", port)).await?);
        let local_addr = listener.local_addr()?;
        let (jobs, queue) = mpsc::channel(QUEUE_CAPACITY);
        let permits = Arc::new(Semaphore::new(workers));

        info!("Audio endpoint listening on {}", local_addr);

        tokio::spawn(dispatch_jobs(listener, queue, permits));

        Ok(Streamer { jobs, local_addr })
    }

    /// Queues one resolved song file for delivery. Waits when all workers are
    /// busy and the queue is at capacity.
    pub async fn submit(&self, path: String) -> Result<(), Error> {
        self.jobs
            .send(StreamJob { path })
            .await
            .map_err(|_| "streaming coordinator is no longer running".into())
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

async fn dispatch_jobs(
    listener: Arc<TcpListener>,
    mut queue: mpsc::Receiver<StreamJob>,
    permits: Arc<Semaphore>,
) {
    while let Some(job) = queue.recv().await {
        // The semaphore is never closed, so acquiring can only fail once the
        // whole coordinator is being torn down.
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let listener = listener.clone();
        tokio::spawn(async move {
            if let Err(e) = stream_song(&listener, &job.path).await {
                error!("Streaming {} failed: {}", job.path, e);
            }
            drop(permit);
        });
    }
}

/// Serves a single play request: waits for the client to open its side
/// connection, then copies the file across in fixed-size chunks.
async fn stream_song(listener: &TcpListener, path: &str) -> Result<(), Error> {
    let (mut socket, client_address) = listener.accept().await?;
    info!("Streaming {} to {:?}", path, client_address);

    let mut file = tokio::fs::File::open(path).await?;
    let mut chunk = [0u8; CHUNK_SIZE];

    loop {
        let read = file.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        socket.write_all(&chunk[..read]).await?;
    }

    socket.shutdown().await?;
    Ok(())
}
