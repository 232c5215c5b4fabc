use super::replay_cache::{repeat, AuthTimeWithHash, ReplayCache};
use crate::error::KrbError;
use binrw::helpers::until_eof;
use binrw::{binread, binwrite, BinRead, BinWrite};
use std::env;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use tracing::{debug, error, trace};
use uzers::get_current_uid;

#[binwrite]
#[bw(big)]
#[binread]
#[br(big)]
#[derive(Debug)]
struct DataComponent {
    #[bw(try_calc(u32::try_from(value.len())))]
    value_len: u32,
    #[br(count = value_len)]
    value: Vec<u8>,
}

#[binwrite]
#[bw(big)]
#[binread]
#[br(big)]
#[derive(Debug)]
struct ReplayRecord {
    client: DataComponent,
    server: DataComponent,
    hash: DataComponent,
    cusec: u32,
    ctime: u32,
}

#[binwrite]
#[bw(big, magic = 0x0501u16)]
#[binread]
#[br(big, magic = 0x0501u16)]
#[derive(Debug)]
struct ReplayFile {
    lifespan: u32,
    #[br(parse_with = until_eof)]
    records: Vec<ReplayRecord>,
}

impl From<&AuthTimeWithHash> for ReplayRecord {
    fn from(entry: &AuthTimeWithHash) -> Self {
        ReplayRecord {
            client: DataComponent {
                value: entry.client.as_bytes().to_vec(),
            },
            server: DataComponent {
                value: entry.server.as_bytes().to_vec(),
            },
            hash: DataComponent {
                value: entry.hash.as_bytes().to_vec(),
            },
            cusec: entry.cusec,
            ctime: entry.ctime,
        }
    }
}

impl TryFrom<&ReplayRecord> for AuthTimeWithHash {
    type Error = KrbError;

    fn try_from(record: &ReplayRecord) -> Result<Self, KrbError> {
        let text = |c: &DataComponent| {
            String::from_utf8(c.value.clone()).map_err(|_| KrbError::ReplayCacheCorrupt)
        };
        Ok(AuthTimeWithHash {
            client: text(&record.client)?,
            server: text(&record.server)?,
            ctime: record.ctime,
            cusec: record.cusec,
            hash: text(&record.hash)?,
        })
    }
}

/// A replay cache kept in a file, so that it survives a restart. Updates are
/// serialised within this process only; processes sharing one file can still
/// lose each other's entries.
#[derive(Debug)]
pub struct DflCache {
    path: PathBuf,
    lifespan: Duration,
    // Serialises the read/modify/write of the file within this process.
    guard: Mutex<()>,
}

impl DflCache {
    pub fn new(path: PathBuf, lifespan: Duration) -> Self {
        DflCache {
            path,
            lifespan,
            guard: Mutex::new(()),
        }
    }

    /// `$KRB5RCACHEDIR/krb5_<uid>.rcache2`, in the temporary directory when
    /// the variable is not set.
    pub fn default_path() -> PathBuf {
        let dir = env::var_os("KRB5RCACHEDIR")
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);
        dir.join(format!("krb5_{}.rcache2", get_current_uid()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Option<ReplayFile>, KrbError> {
        let f = match File::open(&self.path) {
            Ok(f) => f,
            Err(io_err) if io_err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(io_err) => {
                error!(?io_err, path = %self.path.display(), "Unable to open replay cache");
                return Err(KrbError::ReplayCacheIo);
            }
        };

        let mut reader = BufReader::new(f);
        ReplayFile::read(&mut reader)
            .map(Some)
            .map_err(|binrw_err| {
                error!(?binrw_err, path = %self.path.display(), "Unable to read replay cache");
                KrbError::ReplayCacheCorrupt
            })
    }

    /// Replace the whole file. The new contents are written next to it and
    /// renamed into place, so readers never see a half written cache.
    fn rewrite(&self, file: &ReplayFile) -> Result<(), KrbError> {
        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir).map_err(|io_err| {
            error!(?io_err, dir = %dir.display(), "Unable to create replay cache");
            KrbError::ReplayCacheIo
        })?;
        file.write(&mut tmp).map_err(|binrw_err| {
            error!(?binrw_err, "Unable to write binary data.");
            KrbError::BinRWError
        })?;
        tmp.persist(&self.path).map_err(|persist_err| {
            error!(?persist_err, path = %self.path.display(), "Unable to replace replay cache");
            KrbError::ReplayCacheIo
        })?;
        Ok(())
    }

    fn append(&self, record: &ReplayRecord) -> Result<(), KrbError> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|io_err| {
                error!(?io_err, path = %self.path.display(), "Unable to open replay cache");
                KrbError::ReplayCacheIo
            })?;
        record.write(&mut f).map_err(|binrw_err| {
            error!(?binrw_err, "Unable to write binary data.");
            KrbError::BinRWError
        })
    }
}

impl ReplayCache for DflCache {
    fn check_and_store(&self, now: SystemTime, entry: &AuthTimeWithHash) -> Result<(), KrbError> {
        let _guard = self
            .guard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let lifespan = u32::try_from(self.lifespan.as_secs()).unwrap_or(u32::MAX);

        let Some(mut file) = self.load()? else {
            debug!(path = %self.path.display(), "creating replay cache");
            return self.rewrite(&ReplayFile {
                lifespan,
                records: vec![entry.into()],
            });
        };

        let before = file.records.len();
        let mut live = Vec::with_capacity(before);
        for record in file.records.drain(..) {
            let seen = AuthTimeWithHash::try_from(&record)?;
            if seen.is_expired(now, self.lifespan) {
                continue;
            }
            if &seen == entry {
                return Err(repeat(entry));
            }
            live.push(record);
        }

        if live.len() == before && file.lifespan == lifespan {
            self.append(&entry.into())
        } else {
            trace!(dropped = before - live.len(), "expunging replay cache");
            live.push(entry.into());
            file.records = live;
            file.lifespan = lifespan;
            self.rewrite(&file)
        }
    }
}
