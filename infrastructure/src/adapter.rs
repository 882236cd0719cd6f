//! Device Adapter (4.7): the vendor command/response byte constants
//! bound per device variant. These are data, not algorithms — the
//! authoritative values come from the (out-of-scope) USB VID/PID
//! table; this type exposes the shape a collaborator fills in, plus
//! one illustrative constant set used by the CLI demo and tests.

use crate::variant::CheckPrefixFamily;

/// All vendor command payload templates, response prefixes/suffixes,
/// and fixed offsets an Action FSM needs to drive one device variant.
#[derive(Debug, Clone)]
pub struct DeviceAdapter {
    // -- command payload templates --
    /// `list` command payload.
    pub list: Vec<u8>,
    /// `delete` command payload prefix (preceding the encoded id list).
    pub delete_prefix: Vec<u8>,
    /// `check` command prefix for TYPE1 devices.
    pub check_prefix_type1: Vec<u8>,
    /// `check` command prefix for TYPE2 devices.
    pub check_prefix_type2: Vec<u8>,
    /// `check` command trailing suffix.
    pub check_suffix: Vec<u8>,
    /// `sensor_reset` command payload.
    pub sensor_reset: Vec<u8>,
    /// `sensor_enroll` command payload.
    pub sensor_enroll: Vec<u8>,
    /// `sensor_check` command payload.
    pub sensor_check: Vec<u8>,
    /// `sensor_identify` command payload.
    pub sensor_identify: Vec<u8>,
    /// `sensor_start_capture` command payload.
    pub sensor_start_capture: Vec<u8>,
    /// `capture_post_wait_finger` command payload.
    pub capture_post_wait_finger: Vec<u8>,
    /// `read_capture` command payload.
    pub read_capture: Vec<u8>,
    /// `enroll_starting` command payload.
    pub enroll_starting: Vec<u8>,
    /// `commit_starting` command payload.
    pub commit_starting: Vec<u8>,
    /// `new_print` command prefix (preceding the enrollment id on commit).
    pub new_print_prefix: Vec<u8>,
    /// `fw_version` command payload.
    pub fw_version: Vec<u8>,
    /// SDCP `connect` command prefix.
    pub connect_prefix: Vec<u8>,
    /// SDCP `connect` command suffix.
    pub connect_suffix: Vec<u8>,

    // -- response classifiers --
    /// Trailing bytes indicating a finger is present on the sensor.
    pub sensor_has_finger_suffix: Vec<u8>,
    /// Trailing bytes indicating a successful SDCP connect.
    pub sdcp_connect_success_suffix: Vec<u8>,
    /// Leading bytes indicating a successful delete.
    pub delete_success_prefix: Vec<u8>,
    /// Trailing bytes indicating a successful capture read.
    pub read_success_suffix: Vec<u8>,
    /// Trailing bytes indicating an off-center capture.
    pub read_offcenter_suffix: Vec<u8>,
    /// Leading bytes indicating a dirty-sensor capture failure.
    pub read_dirty_prefix: Vec<u8>,
    /// Trailing bytes indicating enrollment capture has started.
    pub enroll_starting_suffix: Vec<u8>,
    /// Trailing bytes indicating a successful commit.
    pub commit_success_suffix: Vec<u8>,
    /// Trailing bytes indicating "not yet enrolled" on a check command
    /// (i.e. not a duplicate).
    pub check_not_yet_enrolled_suffix: Vec<u8>,
    /// Trailing bytes indicating an identify match.
    pub identify_match_suffix: Vec<u8>,
    /// Trailing bytes indicating an identify non-match.
    pub identify_notmatch_suffix: Vec<u8>,
    /// Trailing bytes following the firmware version string.
    pub fw_version_suffix: Vec<u8>,

    // -- fixed offsets --
    /// Bytes to skip before the id list begins in a connect response.
    pub connect_response_prefix_size: usize,
    /// Bytes to skip before the id list begins in a list response.
    pub list_response_prefix_size: usize,
    /// Bytes to skip before the enrollment nonce in an enroll-starting
    /// response.
    pub enroll_starting_response_prefix_size: usize,
    /// Bytes to skip before the payload in an identify response.
    pub identify_response_prefix_size: usize,

    /// Which check-prefix family this variant's `check_prefix_type1`/
    /// `check_prefix_type2` pair should resolve to at the `CHECK`
    /// command call site.
    pub check_prefix_family: CheckPrefixFamily,
}

impl DeviceAdapter {
    /// The `check` command prefix appropriate for this variant's
    /// declared check-prefix family.
    pub fn check_prefix(&self) -> &[u8] {
        match self.check_prefix_family {
            CheckPrefixFamily::Type1 => &self.check_prefix_type1,
            CheckPrefixFamily::Type2 => &self.check_prefix_type2,
        }
    }

    /// An illustrative constant set exercising every field this type
    /// defines, for the CLI demo and integration tests. The
    /// authoritative per-model values are out of scope (see 1.
    /// Non-goals / excluded collaborators).
    pub fn illustrative_default() -> Self {
        Self {
            list: vec![0x01, 0x00],
            delete_prefix: vec![0x02, 0x00],
            check_prefix_type1: vec![0x03, 0x01],
            check_prefix_type2: vec![0x03, 0x02],
            check_suffix: vec![0xFF],
            sensor_reset: vec![0x10],
            sensor_enroll: vec![0x11],
            sensor_check: vec![0x12],
            sensor_identify: vec![0x13],
            sensor_start_capture: vec![0x14],
            capture_post_wait_finger: vec![0x15],
            read_capture: vec![0x16],
            enroll_starting: vec![0x17],
            commit_starting: vec![0x18],
            new_print_prefix: vec![0x19],
            fw_version: vec![0x1A],
            connect_prefix: vec![0x20],
            connect_suffix: vec![0xFE],

            sensor_has_finger_suffix: b"FINGER_ON".to_vec(),
            sdcp_connect_success_suffix: b"CONNECT_OK".to_vec(),
            delete_success_prefix: b"DEL_OK".to_vec(),
            read_success_suffix: b"CAP_OK".to_vec(),
            read_offcenter_suffix: b"OFFCENTER".to_vec(),
            read_dirty_prefix: b"DIRTY".to_vec(),
            enroll_starting_suffix: b"ENROLL_START_OK".to_vec(),
            commit_success_suffix: b"COMMIT_OK".to_vec(),
            check_not_yet_enrolled_suffix: b"NOT_ENROLLED".to_vec(),
            identify_match_suffix: b"MATCH".to_vec(),
            identify_notmatch_suffix: b"NOMATCH".to_vec(),
            fw_version_suffix: b"FW_END".to_vec(),

            connect_response_prefix_size: 6,
            list_response_prefix_size: 6,
            enroll_starting_response_prefix_size: 6,
            identify_response_prefix_size: 6,

            check_prefix_family: CheckPrefixFamily::Type1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_prefix_follows_declared_family() {
        let mut adapter = DeviceAdapter::illustrative_default();
        adapter.check_prefix_family = CheckPrefixFamily::Type2;
        assert_eq!(adapter.check_prefix(), adapter.check_prefix_type2.as_slice());
    }
}
