use crate::{Error, Result, SnowflakeId};

/// Describes how a [`SnowflakeId`] is split into timestamp, machine ID and
/// sequence fields.
///
/// The most significant bit is always reserved and left at zero so that every
/// ID is a non-negative `i64`. The remaining fields are packed from the top
/// down:
///
/// ```text
///  Bit Index:  63           63 62            22 21             12 11             0
///              +--------------+----------------+-----------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | machine ID (10) | sequence (12) |
///              +--------------+----------------+-----------------+---------------+
///              |<----------- MSB ---------- 64 bits ----------- LSB ------------>|
/// ```
///
/// More machine ID bits support more concurrent workers; more sequence bits
/// support more IDs per worker per millisecond. Unused low-order bits between
/// the reserved bit and the timestamp (when the widths sum to less than 63)
/// stay zero.
///
/// # Example
///
/// ```
/// use flakeforge::BitLayout;
///
/// let layout = BitLayout::new(41, 10, 12).unwrap();
/// assert_eq!(layout, BitLayout::TWITTER);
/// assert_eq!(layout.max_machine_id(), 1023);
/// assert_eq!(layout.max_sequence(), 4095);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitLayout {
    timestamp_bits: u8,
    machine_id_bits: u8,
    sequence_bits: u8,
}

impl Default for BitLayout {
    fn default() -> Self {
        Self::TWITTER
    }
}

impl BitLayout {
    /// The reference 41/10/12 split.
    pub const TWITTER: Self = Self {
        timestamp_bits: 41,
        machine_id_bits: 10,
        sequence_bits: 12,
    };

    /// Bits available below the reserved sign bit.
    pub const USABLE_BITS: u8 = 63;

    /// Builds a layout from explicit field widths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] if any field is zero bits wide or the
    /// widths sum to more than [`Self::USABLE_BITS`].
    pub fn new(timestamp_bits: u8, machine_id_bits: u8, sequence_bits: u8) -> Result<Self> {
        let total = u16::from(timestamp_bits) + u16::from(machine_id_bits) + u16::from(sequence_bits);
        if timestamp_bits == 0
            || machine_id_bits == 0
            || sequence_bits == 0
            || total > u16::from(Self::USABLE_BITS)
        {
            return Err(Error::InvalidLayout {
                timestamp_bits,
                machine_id_bits,
                sequence_bits,
            });
        }
        Ok(Self {
            timestamp_bits,
            machine_id_bits,
            sequence_bits,
        })
    }

    #[must_use]
    pub const fn timestamp_bits(&self) -> u8 {
        self.timestamp_bits
    }

    #[must_use]
    pub const fn machine_id_bits(&self) -> u8 {
        self.machine_id_bits
    }

    #[must_use]
    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    /// Number of bits to shift the timestamp to its position.
    #[must_use]
    pub const fn timestamp_shift(&self) -> u32 {
        self.machine_id_bits as u32 + self.sequence_bits as u32
    }

    /// Number of bits to shift the machine ID to its position.
    #[must_use]
    pub const fn machine_id_shift(&self) -> u32 {
        self.sequence_bits as u32
    }

    const fn mask(bits: u8) -> u64 {
        (1 << bits) - 1
    }

    /// Largest epoch-relative timestamp the layout can hold.
    #[must_use]
    pub const fn max_timestamp(&self) -> u64 {
        Self::mask(self.timestamp_bits)
    }

    /// Largest machine ID the layout can hold.
    #[must_use]
    pub const fn max_machine_id(&self) -> u64 {
        Self::mask(self.machine_id_bits)
    }

    /// Largest sequence value within a single millisecond.
    #[must_use]
    pub const fn max_sequence(&self) -> u64 {
        Self::mask(self.sequence_bits)
    }

    /// Packs the three fields into an ID.
    ///
    /// Out-of-range components are truncated to their field width; debug
    /// builds assert instead.
    #[must_use]
    pub fn compose(&self, timestamp: u64, machine_id: u64, sequence: u64) -> SnowflakeId {
        debug_assert!(timestamp <= self.max_timestamp(), "timestamp overflow");
        debug_assert!(machine_id <= self.max_machine_id(), "machine_id overflow");
        debug_assert!(sequence <= self.max_sequence(), "sequence overflow");
        let timestamp = (timestamp & self.max_timestamp()) << self.timestamp_shift();
        let machine_id = (machine_id & self.max_machine_id()) << self.machine_id_shift();
        let sequence = sequence & self.max_sequence();
        SnowflakeId::from_raw(timestamp | machine_id | sequence)
    }

    /// Splits an ID back into its fields. The timestamp stays relative to the
    /// epoch the ID was generated with.
    #[must_use]
    pub const fn decompose(&self, id: SnowflakeId) -> SnowflakeParts {
        let raw = id.to_raw();
        SnowflakeParts {
            timestamp: (raw >> self.timestamp_shift()) & self.max_timestamp(),
            machine_id: (raw >> self.machine_id_shift()) & self.max_machine_id(),
            sequence: raw & self.max_sequence(),
        }
    }

    /// Returns `true` if `id` could have been produced under this layout: the
    /// reserved bit and any bits above the timestamp field are zero.
    #[must_use]
    pub const fn is_valid(&self, id: SnowflakeId) -> bool {
        let used = self.timestamp_bits as u32 + self.timestamp_shift();
        id.to_raw() >> used == 0
    }
}

/// The decoded fields of a [`SnowflakeId`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SnowflakeParts {
    /// Milliseconds since the generator's epoch.
    pub timestamp: u64,
    pub machine_id: u64,
    pub sequence: u64,
}

impl SnowflakeParts {
    /// The absolute creation time in milliseconds since the Unix epoch.
    #[must_use]
    pub const fn unix_millis(&self, epoch: u64) -> u64 {
        self.timestamp + epoch
    }
}
