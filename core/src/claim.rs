//! The Claim Store: persists an SDCP session across process
//! invocations so the driver can skip re-running connect while the
//! sensor-declared TTL hasn't elapsed (4.5).
//!
//! TRUST LEVEL: Secure Core

use crate::error::SdcpError;
use crate::session::ClaimMaterial;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const CLAIM_VERSION: u32 = 1;
const RECORD_LEN: usize = 4 + 8 + 32 + 32 + 32 + 65 + 32 + 1;

/// A claim loaded from disk, not yet judged live or expired.
pub struct LoadedClaim {
    connected_realtime: u64,
    material: ClaimMaterial,
}

impl LoadedClaim {
    /// Whether this claim is still within `claim_expiration_seconds` of
    /// its `connected_realtime`, as of the wall clock right now.
    pub fn is_live(&self, claim_expiration_seconds: i64) -> bool {
        let now = unix_now();
        let age = now.saturating_sub(self.connected_realtime) as i64;
        age <= claim_expiration_seconds
    }

    /// Consume the claim, yielding the session material it carried.
    pub fn into_material(self) -> ClaimMaterial {
        self.material
    }
}

/// Handle to a single device's claim file, keyed by its serial number
/// under a per-user state directory.
pub struct ClaimStore {
    path: PathBuf,
}

impl ClaimStore {
    /// Open the claim file location for a device serial under `state_dir`
    /// (typically `$XDG_STATE_HOME/sdcp` or equivalent, chosen by the
    /// caller — this type has no opinion on where that directory lives).
    pub fn new(state_dir: &Path, device_serial: &str) -> Self {
        Self {
            path: state_dir.join(format!("{device_serial}.claim")),
        }
    }

    /// Load and parse the claim file, if one exists. Returns `None` if
    /// no claim has ever been persisted for this device ("empty"
    /// state). A malformed file is treated as absent and removed.
    pub fn load(&self) -> Result<Option<LoadedClaim>, SdcpError> {
        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SdcpError::Io(e)),
        };

        let mut buf = Vec::with_capacity(RECORD_LEN);
        file.read_to_end(&mut buf)?;
        drop(file);

        match parse_record(&buf) {
            Ok(claim) => Ok(Some(claim)),
            Err(_) => {
                let _ = self.delete();
                Ok(None)
            }
        }
    }

    /// Load the claim and judge it against `claim_expiration_seconds`,
    /// deleting the file if it is expired. This is the entry point Open
    /// uses to decide whether connect can be skipped.
    pub fn load_if_live(&self, claim_expiration_seconds: i64) -> Result<Option<ClaimMaterial>, SdcpError> {
        let Some(claim) = self.load()? else {
            return Ok(None);
        };
        if claim.is_live(claim_expiration_seconds) {
            Ok(Some(claim.into_material()))
        } else {
            self.delete()?;
            Ok(None)
        }
    }

    /// Persist session material, overwriting any existing claim for
    /// this device. Written with 0600 permissions.
    pub fn save(&self, material: &ClaimMaterial) -> Result<(), SdcpError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let record = encode_record(material);

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        file.write_all(&record)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Delete any persisted claim for this device. A no-op if none
    /// exists.
    pub fn delete(&self) -> Result<(), SdcpError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SdcpError::Io(e)),
        }
    }
}

fn encode_record(material: &ClaimMaterial) -> Vec<u8> {
    let mut out = Vec::with_capacity(RECORD_LEN);
    out.extend_from_slice(&CLAIM_VERSION.to_le_bytes());
    out.extend_from_slice(&material.connected_realtime.to_le_bytes());
    out.extend_from_slice(&material.master_secret);
    out.extend_from_slice(&material.application_secret);
    out.extend_from_slice(&material.application_symmetric_key);
    out.extend_from_slice(&material.host_public_key);
    out.extend_from_slice(&material.host_private_key);
    out.push(u8::from(material.supports_reconnect));
    out
}

fn parse_record(buf: &[u8]) -> Result<LoadedClaim, SdcpError> {
    if buf.len() != RECORD_LEN {
        return Err(SdcpError::DataInvalid("claim file has the wrong length"));
    }

    let mut pos = 0usize;
    let version = u32::from_le_bytes(buf[pos..pos + 4].try_into().unwrap());
    pos += 4;
    if version != CLAIM_VERSION {
        return Err(SdcpError::DataInvalid("claim file version is not supported"));
    }

    let connected_realtime = u64::from_le_bytes(buf[pos..pos + 8].try_into().unwrap());
    pos += 8;

    let mut master_secret = [0u8; 32];
    master_secret.copy_from_slice(&buf[pos..pos + 32]);
    pos += 32;

    let mut application_secret = [0u8; 32];
    application_secret.copy_from_slice(&buf[pos..pos + 32]);
    pos += 32;

    let mut application_symmetric_key = [0u8; 32];
    application_symmetric_key.copy_from_slice(&buf[pos..pos + 32]);
    pos += 32;

    let mut host_public_key = [0u8; 65];
    host_public_key.copy_from_slice(&buf[pos..pos + 65]);
    pos += 65;

    let mut host_private_key = [0u8; 32];
    host_private_key.copy_from_slice(&buf[pos..pos + 32]);
    pos += 32;

    let supports_reconnect = buf[pos] != 0;

    Ok(LoadedClaim {
        connected_realtime,
        material: ClaimMaterial {
            master_secret,
            application_secret,
            application_symmetric_key,
            host_public_key,
            host_private_key,
            connected_realtime,
            supports_reconnect,
        },
    })
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_material(connected_realtime: u64) -> ClaimMaterial {
        ClaimMaterial {
            master_secret: [1u8; 32],
            application_secret: [2u8; 32],
            application_symmetric_key: [3u8; 32],
            host_public_key: [4u8; 65],
            host_private_key: [5u8; 32],
            connected_realtime,
            supports_reconnect: true,
        }
    }

    #[test]
    fn empty_store_loads_none() {
        let dir = std::env::temp_dir().join(format!("sdcp-claim-test-empty-{:?}", std::thread::current().id()));
        let store = ClaimStore::new(&dir, "SN-EMPTY");
        assert!(store.load().unwrap().is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_then_load_round_trips_and_is_live() {
        let dir = std::env::temp_dir().join(format!("sdcp-claim-test-live-{:?}", std::thread::current().id()));
        let store = ClaimStore::new(&dir, "SN-LIVE");
        let material = sample_material(unix_now());
        store.save(&material).unwrap();

        let loaded = store.load().unwrap().expect("claim should load");
        assert!(loaded.is_live(86_400));
        let material_back = loaded.into_material();
        assert_eq!(material_back.master_secret, material.master_secret);
        assert!(material_back.supports_reconnect);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn expired_claim_is_deleted_on_load_if_live() {
        let dir = std::env::temp_dir().join(format!("sdcp-claim-test-expired-{:?}", std::thread::current().id()));
        let store = ClaimStore::new(&dir, "SN-EXPIRED");
        let ancient = unix_now().saturating_sub(1_000_000);
        store.save(&sample_material(ancient)).unwrap();

        let result = store.load_if_live(60).unwrap();
        assert!(result.is_none());
        assert!(store.load().unwrap().is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = std::env::temp_dir().join(format!("sdcp-claim-test-delete-{:?}", std::thread::current().id()));
        let store = ClaimStore::new(&dir, "SN-DELETE");
        store.delete().unwrap();
        store.delete().unwrap();
        let _ = fs::remove_dir_all(&dir);
    }
}
