use core::fmt;

use crate::BitLayout;

/// A 64-bit Snowflake ID.
///
/// The value is an opaque bit pattern; interpret its fields with the
/// [`BitLayout`] that produced it. IDs compare by raw value, which orders them
/// by creation time first (timestamp occupies the most significant bits),
/// then by machine ID and sequence.
///
/// # Example
///
/// ```
/// use flakeforge::{BitLayout, SnowflakeId};
///
/// let id = BitLayout::TWITTER.compose(0, 5, 1);
/// assert_eq!(id, SnowflakeId::from_raw(20481));
/// assert_eq!(id.to_i64(), 20481);
/// assert_eq!(id.to_string(), "20481");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    #[must_use]
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Returns the ID as a signed 64-bit integer.
    ///
    /// IDs produced by a generator never set the reserved top bit, so this is
    /// always non-negative for them.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn to_i64(&self) -> i64 {
        self.id as i64
    }

    /// Renders the ID as a table of its fields under `layout`.
    #[must_use]
    pub fn display_layout(&self, layout: BitLayout) -> LayoutDisplay {
        LayoutDisplay { id: *self, layout }
    }
}

impl From<SnowflakeId> for i64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_i64()
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl TryFrom<i64> for SnowflakeId {
    type Error = core::num::TryFromIntError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value).map(Self::from_raw)
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SnowflakeId").field(&self.id).finish()
    }
}

/// Field-by-field rendering of a [`SnowflakeId`], returned by
/// [`SnowflakeId::display_layout`].
///
/// ```text
/// SnowflakeId {
///     raw id     : 0x0000000000005001 (20481)
///     layout     :
///         +----------------+-----------------+---------------+
///         | timestamp (41) | machine_id (10) | sequence (12) |
///         +----------------+-----------------+---------------+
///         |       0        |        5        |       1       |
///         |      0x0       |       0x5       |      0x1      |
///         +----------------+-----------------+---------------+
/// }
/// ```
pub struct LayoutDisplay {
    id: SnowflakeId,
    layout: BitLayout,
}

#[derive(Clone, Copy)]
struct FieldLayout {
    name: &'static str,
    bits: u8,
    value: u64,
}

fn center(s: &str, width: usize) -> String {
    let len = s.len();
    if len >= width {
        return s.to_owned();
    }
    let pad = width - len;
    let left = pad / 2;
    let right = pad - left;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
}

impl fmt::Display for LayoutDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self.layout.decompose(self.id);
        let fields = [
            FieldLayout {
                name: "timestamp",
                bits: self.layout.timestamp_bits(),
                value: parts.timestamp,
            },
            FieldLayout {
                name: "machine_id",
                bits: self.layout.machine_id_bits(),
                value: parts.machine_id,
            },
            FieldLayout {
                name: "sequence",
                bits: self.layout.sequence_bits(),
                value: parts.sequence,
            },
        ];

        let labels = fields.map(|field| format!("{} ({})", field.name, field.bits));
        let decimals = fields.map(|field| field.value.to_string());
        let hexes = fields.map(|field| format!("0x{:x}", field.value));

        // Widest of label, decimal and hex, plus padding
        let mut columns = [0usize; 3];
        for (i, width) in columns.iter_mut().enumerate() {
            *width = labels[i].len().max(decimals[i].len()).max(hexes[i].len()) + 2;
        }

        let border = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
            write!(f, "        +")?;
            for &w in &columns {
                write!(f, "{}+", "-".repeat(w))?;
            }
            writeln!(f)
        };
        let row = |f: &mut fmt::Formatter<'_>, cells: &[String; 3]| -> fmt::Result {
            write!(f, "        |")?;
            for (cell, &w) in cells.iter().zip(&columns) {
                write!(f, "{}|", center(cell, w))?;
            }
            writeln!(f)
        };

        writeln!(f, "SnowflakeId {{")?;
        writeln!(f, "    raw id     : 0x{:016x} ({})", self.id.id, self.id.id)?;
        writeln!(f, "    layout     :")?;
        border(f)?;
        row(f, &labels)?;
        border(f)?;
        row(f, &decimals)?;
        row(f, &hexes)?;
        border(f)?;
        write!(f, "}}")
    }
}
