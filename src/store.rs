use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::audio::{AudioFormat, StreamableSong, SONG_EXTENSION};
use crate::error::ServiceError;

pub const PLAYLIST_EXTENSION: &str = "txt";

const EMAIL_FIELD: &str = "email";
const PASSWORD_FIELD: &str = "password";
const SONG_FIELD: &str = "song name";
const PLAYLIST_FIELD: &str = "playlist name";

/// One registered account. Identity is the email alone; the password is not
/// part of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub email: String,
    password: String,
}

impl Account {
    /// Parses one `"email password"` line of the durable accounts store.
    fn parse(line: &str) -> Option<Account> {
        let mut parts = line.split_whitespace();
        let email = parts.next()?;
        let password = parts.next()?;

        Some(Account {
            email: normalize_email(email),
            password: password.to_string(),
        })
    }
}

/// The session/account service. Owns the account registry, the logged-in
/// set, the play-count ledger and the open append handle of the accounts
/// file. Clones share one state; the single mutex around it is the only
/// serialization point for registry and playlist mutations.
#[derive(Clone)]
pub struct Store {
    inner: Arc<InnerStore>,
}

struct InnerStore {
    state: Mutex<State>,
    songs_dir: PathBuf,
    playlists_dir: PathBuf,
}

struct State {
    accounts: HashMap<String, Account>,
    logged_in: HashSet<String>,
    plays: HashMap<String, PlayEntry>,
    next_play_seq: u64,
    accounts_out: File,
}

struct PlayEntry {
    count: u32,
    first_played: u64,
}

impl Store {
    /// Loads the account registry from `accounts_file` and keeps an append
    /// handle to it open. A missing or unreadable accounts file is fatal.
    pub fn open(
        accounts_file: impl AsRef<Path>,
        songs_dir: impl Into<PathBuf>,
        playlists_dir: impl Into<PathBuf>,
    ) -> Result<Store, ServiceError> {
        let accounts_file = accounts_file.as_ref();

        let mut accounts = HashMap::new();
        for line in BufReader::new(File::open(accounts_file)?).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match Account::parse(&line) {
                Some(account) => {
                    accounts.insert(account.email.clone(), account);
                }
                None => warn!("Skipping malformed account line: {:?}", line),
            }
        }

        let accounts_out = OpenOptions::new().append(true).open(accounts_file)?;

        Ok(Store {
            inner: Arc::new(InnerStore {
                state: Mutex::new(State {
                    accounts,
                    logged_in: HashSet::new(),
                    plays: HashMap::new(),
                    next_play_seq: 0,
                    accounts_out,
                }),
                songs_dir: songs_dir.into(),
                playlists_dir: playlists_dir.into(),
            }),
        })
    }

    /// Creates an account, persists it and logs it in.
    pub fn register(&self, email: &str, password: &str) -> Result<String, ServiceError> {
        let email = validate_field(email, EMAIL_FIELD)?;
        let password = validate_field(password, PASSWORD_FIELD)?;

        let email = normalize_email(email);
        check_email_format(&email)?;

        let mut state = self.inner.state.lock().unwrap();
        if state.accounts.contains_key(&email) {
            return Err(ServiceError::AccountAlreadyExists);
        }

        // Persist first so a failed write leaves no in-memory trace.
        writeln!(state.accounts_out, "{} {}", email, password)?;
        state.accounts_out.flush()?;

        state.accounts.insert(
            email.clone(),
            Account {
                email: email.clone(),
                password: password.to_string(),
            },
        );
        state.logged_in.insert(email.clone());

        Ok(email)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<String, ServiceError> {
        let email = validate_field(email, EMAIL_FIELD)?;
        let password = validate_field(password, PASSWORD_FIELD)?;

        let email = normalize_email(email);
        check_email_format(&email)?;

        let mut state = self.inner.state.lock().unwrap();
        if state.logged_in.contains(&email) {
            return Err(ServiceError::UserAlreadyLoggedIn(email));
        }

        let account = state
            .accounts
            .get(&email)
            .ok_or_else(|| ServiceError::AccountDoesntExist(email.clone()))?;

        // Secret comparison is case-insensitive.
        if !account.password.eq_ignore_ascii_case(password) {
            return Err(ServiceError::IncorrectCredentials);
        }

        state.logged_in.insert(email.clone());

        Ok(email)
    }

    /// Logs the identity out. A no-op when it was not logged in.
    pub fn disconnect(&self, email: &str) {
        let email = normalize_email(email.trim());
        self.inner.state.lock().unwrap().logged_in.remove(&email);
    }

    pub fn is_logged_in(&self, email: &str) -> bool {
        let email = normalize_email(email.trim());
        self.inner.state.lock().unwrap().logged_in.contains(&email)
    }

    /// Returns the catalog identities whose lowercased form contains any of
    /// the lowercased keywords. The directory scan runs without the state
    /// lock, so a slow walk never stalls other clients.
    pub fn search(&self, keywords: &[String], email: &str) -> Result<BTreeSet<String>, ServiceError> {
        if keywords.is_empty() {
            return Err(ServiceError::MissingKeywords);
        }

        {
            let state = self.inner.state.lock().unwrap();
            require_login(&state, email)?;
        }

        let needles: Vec<String> = keywords.iter().map(|k| k.trim().to_lowercase()).collect();

        let mut matches = BTreeSet::new();
        for entry in fs::read_dir(&self.inner.songs_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let lowered = stem.to_lowercase();
            if needles.iter().any(|needle| lowered.contains(needle)) {
                matches.insert(stem.to_string());
            }
        }

        Ok(matches)
    }

    /// The `count` most played songs, descending; ties keep first-seen order.
    pub fn top(&self, count: i64, email: &str) -> Result<Vec<String>, ServiceError> {
        if count < 0 {
            return Err(ServiceError::InvalidTopCount);
        }

        let state = self.inner.state.lock().unwrap();
        require_login(&state, email)?;

        let mut ranked: Vec<(&String, &PlayEntry)> = state.plays.iter().collect();
        ranked.sort_by(|a, b| {
            b.1.count
                .cmp(&a.1.count)
                .then(a.1.first_played.cmp(&b.1.first_played))
        });

        let limit = usize::try_from(count).unwrap_or(usize::MAX);
        Ok(ranked
            .into_iter()
            .take(limit)
            .map(|(name, _)| name.clone())
            .collect())
    }

    pub fn create_playlist(&self, name: &str, email: &str) -> Result<(), ServiceError> {
        let name = validate_field(name, PLAYLIST_FIELD)?;

        let state = self.inner.state.lock().unwrap();
        let email = require_login(&state, email)?;

        if self.playlist_exists(name)? {
            return Err(ServiceError::PlaylistAlreadyExists(name.to_string()));
        }

        let mut file = File::create(self.playlist_path(name))?;
        writeln!(file, "{}", email)?;
        drop(state);

        Ok(())
    }

    pub fn add_song_to_playlist(
        &self,
        playlist: &str,
        song: &str,
        email: &str,
    ) -> Result<(), ServiceError> {
        let playlist = validate_field(playlist, PLAYLIST_FIELD)?;
        let song = validate_field(song, SONG_FIELD)?;

        let state = self.inner.state.lock().unwrap();
        require_login(&state, email)?;

        let path = self.playlist_path(playlist);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ServiceError::PlaylistDoesntExist(playlist.to_string()))
            }
            Err(err) => return Err(err.into()),
        };

        if contents
            .lines()
            .any(|line| line.trim().eq_ignore_ascii_case(song))
        {
            return Err(ServiceError::PlaylistAlreadyContainsSong(song.to_string()));
        }

        let mut file = OpenOptions::new().append(true).open(&path)?;
        writeln!(file, "{}", song)?;
        drop(state);

        Ok(())
    }

    /// All lines of a playlist file: the creator first, then the members in
    /// the order they were added.
    pub fn show_playlist(&self, name: &str, email: &str) -> Result<Vec<String>, ServiceError> {
        let name = validate_field(name, PLAYLIST_FIELD)?;

        let state = self.inner.state.lock().unwrap();
        require_login(&state, email)?;
        drop(state);

        match fs::read_to_string(self.playlist_path(name)) {
            Ok(contents) => Ok(contents.lines().map(str::to_string).collect()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(ServiceError::PlaylistDoesntExist(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Resolves a catalog entry for streaming and counts the play.
    pub fn stream_song(&self, song: &str, email: &str) -> Result<StreamableSong, ServiceError> {
        let song = validate_field(song, SONG_FIELD)?;

        let mut state = self.inner.state.lock().unwrap();
        require_login(&state, email)?;

        let path = self
            .inner
            .songs_dir
            .join(format!("{}.{}", song, SONG_EXTENSION));
        let format = AudioFormat::probe(&path)
            .map_err(|_| ServiceError::SongDoesntExist(song.to_string()))?;

        if !state.plays.contains_key(song) {
            let seq = state.next_play_seq;
            state.plays.insert(
                song.to_string(),
                PlayEntry {
                    count: 0,
                    first_played: seq,
                },
            );
            state.next_play_seq += 1;
        }
        if let Some(entry) = state.plays.get_mut(song) {
            entry.count += 1;
        }

        Ok(StreamableSong {
            name: song.to_string(),
            path: path.to_string_lossy().into_owned(),
            format,
        })
    }

    fn playlist_path(&self, name: &str) -> PathBuf {
        self.inner
            .playlists_dir
            .join(format!("{}.{}", name, PLAYLIST_EXTENSION))
    }

    /// Case-insensitive existence check over the playlists directory.
    fn playlist_exists(&self, name: &str) -> Result<bool, ServiceError> {
        let target = format!("{}.{}", name, PLAYLIST_EXTENSION);

        for entry in fs::read_dir(&self.inner.playlists_dir)? {
            let file_name = entry?.file_name();
            if file_name.to_string_lossy().eq_ignore_ascii_case(&target) {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

fn require_login(state: &State, email: &str) -> Result<String, ServiceError> {
    let email = normalize_email(email.trim());
    if !state.logged_in.contains(&email) {
        return Err(ServiceError::UserNotLoggedIn);
    }
    Ok(email)
}

fn validate_field<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::BlankField(field));
    }
    Ok(value)
}

/// One normalization policy everywhere: emails are lowercased at the
/// boundary, so registry keys, the logged-in set and the durable store agree.
fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}

fn check_email_format(email: &str) -> Result<(), ServiceError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ServiceError::InvalidEmailFormat)
    }
}

/// `user@smt.domain`, where `user` starts with a letter, ends with a letter
/// or digit and otherwise holds letters, digits, '.', '-' or '_'. Operates on
/// already-lowercased input.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    let mut chars = local.chars();
    let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
        return false;
    };
    if chars.as_str().is_empty() {
        return false;
    }
    if !first.is_ascii_alphabetic() || !last.is_ascii_alphanumeric() {
        return false;
    }
    if !local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return false;
    }

    let Some((host, tld)) = domain.split_once('.') else {
        return false;
    };
    !host.is_empty()
        && !tld.is_empty()
        && host.chars().all(|c| c.is_ascii_lowercase())
        && tld.chars().all(|c| c.is_ascii_lowercase())
}
