//! Argument and parameter types used by GNSS Commands
use atat::atat_derive::AtatEnum;

/// Constellations used for positioning, as the `+CGNSSMODE` bit mask.
///
/// GPS is always on. Bit 1 adds GLONASS, bit 2 GALILEO and bit 3 BEIDOU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GnssMode {
    Gps = 1,
    GpsGlonass = 3,
    GpsGalileo = 5,
    GpsBeidou = 9,
    GpsGalileoBeidou = 13,
    All = 15,
}

impl GnssMode {
    const fn mask(self) -> u8 {
        self as u8
    }

    pub const fn glonass(self) -> bool {
        self.mask() & 0b0010 != 0
    }

    pub const fn galileo(self) -> bool {
        self.mask() & 0b0100 != 0
    }

    pub const fn beidou(self) -> bool {
        self.mask() & 0b1000 != 0
    }
}
