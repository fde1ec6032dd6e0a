//! Persisted board parameters.
//!
//! The parameter block is stored as one fixed-size record:
//!
//! ```text
//! +------------------------------+-----------+
//! | board id, NUL padded (17 B)  | CRC-32 LE |
//! +------------------------------+-----------+
//! ```
//!
//! A record whose checksum does not match is ignored and the defaults are
//! used instead.

use core::fmt;

use cmdproc_config::{BOARD_ID_MAX_LEN, DEFAULT_BOARD_ID};
use heapless::String;

const ID_FIELD_LEN: usize = BOARD_ID_MAX_LEN + 1;
const CRC_LEN: usize = 4;

/// Size of the serialised parameter record.
pub const RECORD_LEN: usize = ID_FIELD_LEN + CRC_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NvError {

    /// The backing store could not be read or written.
    Store,

    /// Stored checksum does not match the record.
    Checksum,

    /// Checksum matched but the content is not a valid board ID.
    Corrupt,

    /// Board ID empty, too long or not printable ASCII.
    InvalidId,
}

impl fmt::Display for NvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NvError::Store => f.write_str("parameter store access failed"),
            NvError::Checksum => f.write_str("parameter checksum mismatch"),
            NvError::Corrupt => f.write_str("parameter record corrupt"),
            NvError::InvalidId => f.write_str("invalid board id"),
        }
    }
}

/// Byte-addressed non-volatile storage holding the parameter record at offset 0.
pub trait ParamStore {

    /// Fills `buf` from the start of the store.
    fn load(&mut self, buf: &mut [u8]) -> Result<(), NvError>;

    /// Writes `data` to the start of the store.
    fn save(&mut self, data: &[u8]) -> Result<(), NvError>;
}

/// RAM-backed store, erased (`0xFF`) on creation.
#[derive(Debug, Clone)]
pub struct MemoryStore<const N: usize> {
    data: [u8; N],
}

impl<const N: usize> MemoryStore<N> {
    pub const fn new() -> Self {
        Self { data: [0xFF; N] }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl<const N: usize> Default for MemoryStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ParamStore for MemoryStore<N> {
    fn load(&mut self, buf: &mut [u8]) -> Result<(), NvError> {
        let src = self.data.get(..buf.len()).ok_or(NvError::Store)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn save(&mut self, data: &[u8]) -> Result<(), NvError> {
        let dst = self.data.get_mut(..data.len()).ok_or(NvError::Store)?;
        dst.copy_from_slice(data);
        Ok(())
    }
}

/// Board parameters kept across power cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NvParams {
    board_id: String<BOARD_ID_MAX_LEN>,
}

impl NvParams {
    pub fn defaults() -> Self {
        let mut board_id = String::new();
        // DEFAULT_BOARD_ID is shorter than BOARD_ID_MAX_LEN
        let _ = board_id.push_str(DEFAULT_BOARD_ID);
        Self { board_id }
    }

    /// Loads the stored record, or falls back to the defaults when it is
    /// missing or damaged.
    pub fn init<S: ParamStore>(store: &mut S) -> Self {
        match Self::load(store) {
            Ok(params) => params,
            Err(e) => {
                warn!("parameters not loaded ({}), using defaults", e);
                Self::defaults()
            }
        }
    }

    pub fn load<S: ParamStore>(store: &mut S) -> Result<Self, NvError> {
        let mut record = [0u8; RECORD_LEN];
        store.load(&mut record)?;
        Self::decode(&record)
    }

    pub fn save<S: ParamStore>(&self, store: &mut S) -> Result<(), NvError> {
        store.save(&self.encode())?;
        debug!("parameters saved");
        Ok(())
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    /// Replaces the board ID. Only printable ASCII without spaces is accepted.
    pub fn set_board_id(&mut self, id: &str) -> Result<(), NvError> {
        if !is_valid_id(id.as_bytes()) {
            return Err(NvError::InvalidId);
        }
        let mut board_id = String::new();
        board_id.push_str(id).map_err(|_| NvError::InvalidId)?;
        self.board_id = board_id;
        Ok(())
    }

    fn encode(&self) -> [u8; RECORD_LEN] {
        let mut record = [0u8; RECORD_LEN];
        let id = self.board_id.as_bytes();
        record[..id.len()].copy_from_slice(id);
        let crc = checksum(&record[..ID_FIELD_LEN]);
        record[ID_FIELD_LEN..].copy_from_slice(&crc.to_le_bytes());
        record
    }

    fn decode(record: &[u8; RECORD_LEN]) -> Result<Self, NvError> {
        let (id_field, crc_field) = record.split_at(ID_FIELD_LEN);
        let stored = u32::from_le_bytes([crc_field[0], crc_field[1], crc_field[2], crc_field[3]]);
        if checksum(id_field) != stored {
            return Err(NvError::Checksum);
        }

        let len = id_field.iter().position(|&b| b == 0).ok_or(NvError::Corrupt)?;
        let id = core::str::from_utf8(&id_field[..len]).map_err(|_| NvError::Corrupt)?;
        let mut params = Self::defaults();
        params.set_board_id(id).map_err(|_| NvError::Corrupt)?;
        Ok(params)
    }
}

impl Default for NvParams {
    fn default() -> Self {
        Self::defaults()
    }
}

fn is_valid_id(id: &[u8]) -> bool {
    !id.is_empty() && id.len() <= BOARD_ID_MAX_LEN && id.iter().all(|b| b.is_ascii_graphic())
}

fn checksum(bytes: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erased_store_gives_defaults() {
        let mut store = MemoryStore::<64>::new();
        assert_eq!(NvParams::load(&mut store), Err(NvError::Checksum));
        assert_eq!(NvParams::init(&mut store).board_id(), DEFAULT_BOARD_ID);
    }

    #[test]
    fn test_save_then_init() {
        let mut store = MemoryStore::<64>::new();
        let mut params = NvParams::defaults();
        params.set_board_id("SN-4711").unwrap();
        params.save(&mut store).unwrap();

        assert_eq!(NvParams::init(&mut store).board_id(), "SN-4711");
    }

    #[test]
    fn test_record_layout() {
        let mut store = MemoryStore::<RECORD_LEN>::new();
        let mut params = NvParams::defaults();
        params.set_board_id("AB").unwrap();
        params.save(&mut store).unwrap();

        let bytes = store.as_bytes();
        assert_eq!(&bytes[..3], b"AB\0");
        assert!(bytes[3..ID_FIELD_LEN].iter().all(|&b| b == 0));
        let crc = checksum(&bytes[..ID_FIELD_LEN]).to_le_bytes();
        assert_eq!(&bytes[ID_FIELD_LEN..], &crc);
    }

    #[test]
    fn test_corrupted_record_rejected() {
        let mut store = MemoryStore::<64>::new();
        let mut params = NvParams::defaults();
        params.set_board_id("GOOD").unwrap();
        params.save(&mut store).unwrap();

        store.as_bytes_mut()[1] ^= 0x01;
        assert_eq!(NvParams::load(&mut store), Err(NvError::Checksum));
        assert_eq!(NvParams::init(&mut store).board_id(), DEFAULT_BOARD_ID);
    }

    #[test]
    fn test_unterminated_id_is_corrupt() {
        let mut record = [b'A'; RECORD_LEN];
        let crc = checksum(&record[..ID_FIELD_LEN]).to_le_bytes();
        record[ID_FIELD_LEN..].copy_from_slice(&crc);
        assert_eq!(NvParams::decode(&record), Err(NvError::Corrupt));
    }

    #[test]
    fn test_store_too_small() {
        let mut store = MemoryStore::<8>::new();
        assert_eq!(NvParams::defaults().save(&mut store), Err(NvError::Store));
        assert_eq!(NvParams::load(&mut store), Err(NvError::Store));
    }

    #[test]
    fn test_invalid_ids() {
        let mut params = NvParams::defaults();
        assert_eq!(params.set_board_id(""), Err(NvError::InvalidId));
        assert_eq!(params.set_board_id("A B"), Err(NvError::InvalidId));
        assert_eq!(params.set_board_id("0123456789ABCDEFG"), Err(NvError::InvalidId));
        assert_eq!(params.board_id(), DEFAULT_BOARD_ID);
        assert!(params.set_board_id("0123456789ABCDEF").is_ok());
    }
}
