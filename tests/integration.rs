use futures::{SinkExt, StreamExt};
use serial_test::serial;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::{sleep, Duration};
use tokio_util::codec::Framed;

use rustify::codec::EnvelopeCodec;
use rustify::commands::CommandType;
use rustify::frame::{Frame, Request, Response};
use rustify::server::{self, Config};

/// Minimal 16-bit PCM WAV file bytes.
fn wav_bytes(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let byte_rate = sample_rate * u32::from(channels) * 2;
    let block_align = channels * 2;

    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

struct TestServer {
    _root: TempDir,
    stream_port: u16,
    dream_wav: Vec<u8>,
}

/// Spawns a server over scratch directories seeded with one existing account
/// and a two-song catalog.
async fn start_server(port: u16, stream_port: u16) -> TestServer {
    let root = tempfile::tempdir().unwrap();

    let accounts_file = root.path().join("accounts.txt");
    std::fs::write(&accounts_file, "existing@abv.bg secret\n").unwrap();

    let songs_dir = root.path().join("songs");
    let playlists_dir = root.path().join("playlists");
    std::fs::create_dir(&songs_dir).unwrap();
    std::fs::create_dir(&playlists_dir).unwrap();

    let dream_wav = wav_bytes(8_000, 1, &[0, 64, -64, 127, -127, 32]);
    std::fs::write(songs_dir.join("dream.wav"), &dream_wav).unwrap();
    std::fs::write(songs_dir.join("test song.wav"), wav_bytes(8_000, 1, &[1, 2])).unwrap();

    tokio::spawn(server::run(Config {
        port,
        stream_port,
        accounts_file,
        songs_dir,
        playlists_dir,
        stream_workers: 2,
    }));
    sleep(Duration::from_millis(100)).await;

    TestServer {
        _root: root,
        stream_port,
        dream_wav,
    }
}

type Client = Framed<TcpStream, EnvelopeCodec>;

async fn connect(port: u16) -> Client {
    let stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    Framed::new(stream, EnvelopeCodec)
}

async fn send(client: &mut Client, email: &str, line: &str) -> Response {
    client
        .send(Frame::Request(Request {
            email: email.to_string(),
            line: line.to_string(),
        }))
        .await
        .unwrap();

    match client.next().await.expect("server closed the connection") {
        Ok(Frame::Response(response)) => response,
        other => panic!("expected a response frame, got {:?}", other),
    }
}

#[tokio::test]
#[serial]
async fn test_register_and_login_flow() {
    start_server(44_461, 44_462).await;
    let mut client = connect(44_461).await;

    let registered = send(&mut client, "", "register new@abv.bg 123").await;
    assert_eq!(registered.command, CommandType::Register);
    assert_eq!(registered.message, "Account was registered successfully");
    assert_eq!(registered.email, "new@abv.bg");

    // Registration implies login.
    let relogin = send(&mut client, "new@abv.bg", "login new@abv.bg 123").await;
    assert_eq!(relogin.command, CommandType::Error);
    assert!(relogin.message.contains("already logged in"));

    let disconnected = send(&mut client, "new@abv.bg", "disconnect").await;
    assert_eq!(disconnected.command, CommandType::Disconnect);
    assert_eq!(disconnected.message, "Disconnected");

    let wrong = send(&mut client, "", "login new@abv.bg nope").await;
    assert_eq!(wrong.command, CommandType::Error);
    assert!(wrong.message.contains("Incorrect password."));

    let ghost = send(&mut client, "", "login ghost@abv.bg 123").await;
    assert_eq!(ghost.command, CommandType::Error);
    assert!(ghost.message.contains("doesn't exist"));

    let welcome = send(&mut client, "", "login new@abv.bg 123").await;
    assert_eq!(welcome.command, CommandType::Login);
    assert_eq!(welcome.message, "Welcome new@abv.bg");
}

#[tokio::test]
#[serial]
async fn test_bad_input_keeps_the_connection_usable() {
    start_server(44_463, 44_464).await;
    let mut client = connect(44_463).await;

    let unknown = send(&mut client, "", "frobnicate now").await;
    assert_eq!(unknown.command, CommandType::Error);
    assert!(unknown.message.contains("Command with name \"frobnicate\" doesn't exist"));

    let missing = send(&mut client, "", "register lonely@abv.bg").await;
    assert_eq!(missing.command, CommandType::Error);
    assert!(missing.message.contains("Insufficient arguments"));
    assert!(missing.message.contains("email and password"));

    let anonymous = send(&mut client, "", "search rock").await;
    assert_eq!(anonymous.command, CommandType::Error);
    assert!(anonymous.message.contains("You must login or register"));

    // The same connection still serves valid commands.
    let registered = send(&mut client, "", "register lonely@abv.bg 123").await;
    assert_eq!(registered.command, CommandType::Register);
}

#[tokio::test]
#[serial]
async fn test_search_and_playlist_flow() {
    let _server = start_server(44_465, 44_466).await;
    let mut client = connect(44_465).await;

    send(&mut client, "", "register fan@abv.bg 123").await;

    let found = send(&mut client, "fan@abv.bg", "search dream test").await;
    assert_eq!(found.command, CommandType::Search);
    assert_eq!(
        found.message,
        "These are the songs that were found using the keywords:\n\tdream\n\ttest song"
    );

    let nothing = send(&mut client, "fan@abv.bg", "search zzz").await;
    assert_eq!(nothing.message, "No songs were found containing the keywords");

    let created = send(&mut client, "fan@abv.bg", "create-playlist \"night drive\"").await;
    assert_eq!(created.command, CommandType::CreatePlaylist);
    assert_eq!(created.message, "Playlist 'night drive' was created");

    let added = send(&mut client, "fan@abv.bg", "add-song-to \"night drive\" dream").await;
    assert_eq!(added.command, CommandType::AddSongTo);
    assert_eq!(added.message, "'dream' was added successfully to 'night drive'");

    let duplicate = send(&mut client, "fan@abv.bg", "add-song-to \"night drive\" DREAM").await;
    assert_eq!(duplicate.command, CommandType::Error);
    assert!(duplicate.message.contains("already added to the playlist"));

    let shown = send(&mut client, "fan@abv.bg", "show-playlist \"night drive\"").await;
    assert_eq!(shown.command, CommandType::ShowPlaylist);
    assert_eq!(
        shown.message,
        "Playlist 'night drive' created by 'fan@abv.bg'\n\tdream"
    );
}

#[tokio::test]
#[serial]
async fn test_play_delivers_audio_over_the_side_connection() {
    let server = start_server(44_467, 44_468).await;
    let mut client = connect(44_467).await;

    send(&mut client, "", "register deejay@abv.bg 123").await;

    let playing = send(&mut client, "deejay@abv.bg", "play dream").await;
    assert_eq!(playing.command, CommandType::Play);
    assert_eq!(playing.message, "Playing song \"dream\"");

    let song = playing.song.expect("a successful play carries the song");
    assert_eq!(song.name, "dream");
    assert_eq!(song.format.encoding, "PCM_SIGNED");
    assert_eq!(song.format.sample_rate, 8_000.0);

    // The side connection delivers the raw file bytes.
    let mut audio = TcpStream::connect(("127.0.0.1", server.stream_port))
        .await
        .unwrap();
    let mut received = Vec::new();
    audio.read_to_end(&mut received).await.unwrap();
    assert_eq!(received, server.dream_wav);

    let stopped = send(&mut client, "deejay@abv.bg", "stop").await;
    assert_eq!(stopped.command, CommandType::Stop);
    assert_eq!(stopped.message, "Song stopped");

    let top = send(&mut client, "deejay@abv.bg", "top 10").await;
    assert_eq!(top.command, CommandType::Top);
    assert_eq!(top.message, "Most played songs:\n\tdream");

    let ghost = send(&mut client, "deejay@abv.bg", "play ghost").await;
    assert_eq!(ghost.command, CommandType::Error);
    assert!(ghost.message.contains("doesn't exist in the dataset"));
}
