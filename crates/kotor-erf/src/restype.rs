use std::fmt;
use std::str::FromStr;

/// A numeric resource type, as stored in archives and key tables.
///
/// Unknown type IDs are preserved as-is; only the extension lookup needs a known type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceType(pub u16);

/// Known resource types and their file extensions.
const KNOWN_TYPES: &[(u16, &str)] = &[
    (0, "res"),
    (1, "bmp"),
    (3, "tga"),
    (4, "wav"),
    (6, "plt"),
    (7, "ini"),
    (10, "txt"),
    (2002, "mdl"),
    (2009, "nss"),
    (2010, "ncs"),
    (2012, "are"),
    (2013, "set"),
    (2014, "ifo"),
    (2015, "bic"),
    (2016, "wok"),
    (2017, "2da"),
    (2018, "tlk"),
    (2022, "txi"),
    (2023, "git"),
    (2024, "bti"),
    (2025, "uti"),
    (2026, "btc"),
    (2027, "utc"),
    (2029, "dlg"),
    (2030, "itp"),
    (2032, "utt"),
    (2033, "dds"),
    (2035, "uts"),
    (2036, "ltr"),
    (2037, "gff"),
    (2038, "fac"),
    (2040, "ute"),
    (2042, "utd"),
    (2044, "utp"),
    (2045, "dft"),
    (2046, "gic"),
    (2047, "gui"),
    (2051, "utm"),
    (2052, "dwk"),
    (2053, "pwk"),
    (2056, "jrl"),
    (2058, "utw"),
    (2060, "ssf"),
    (2064, "ndb"),
    (2065, "ptm"),
    (2066, "ptt"),
    (3000, "lyt"),
    (3001, "vis"),
    (3002, "rim"),
    (3003, "pth"),
    (3004, "lip"),
    (3007, "tpc"),
    (3008, "mdx"),
    (9997, "erf"),
    (9998, "bif"),
    (9999, "key"),
];

impl ResourceType {
    /// Two-dimensional array tables.
    pub const TWODA: Self = Self(2017);
    /// Talk tables.
    pub const TLK: Self = Self(2018);
    /// Sound sets.
    pub const SSF: Self = Self(2060);
    /// Script source.
    pub const NSS: Self = Self(2009);
    /// Compiled scripts.
    pub const NCS: Self = Self(2010);
    /// Generic GFF files.
    pub const GFF: Self = Self(2037);
    /// Creature blueprints.
    pub const UTC: Self = Self(2027);
    /// Item blueprints.
    pub const UTI: Self = Self(2025);
    /// Dialogs.
    pub const DLG: Self = Self(2029);
    /// Module archives.
    pub const ERF: Self = Self(9997);

    /// Look up a type by its file extension. Case-insensitive.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.to_ascii_lowercase();
        KNOWN_TYPES
            .iter()
            .find(|(_, ext)| *ext == extension)
            .map(|(id, _)| Self(*id))
    }

    /// The file extension for this type, if it is a known type.
    pub fn extension(self) -> Option<&'static str> {
        KNOWN_TYPES
            .iter()
            .find(|(id, _)| *id == self.0)
            .map(|(_, ext)| *ext)
    }

    /// Whether resources of this type are stored as GFF files.
    pub fn is_gff(self) -> bool {
        matches!(
            self.extension(),
            Some(
                "are" | "ifo" | "bic" | "git" | "uti" | "btc" | "utc" | "dlg" | "itp" | "utt"
                    | "uts" | "gff" | "fac" | "ute" | "utd" | "utp" | "gui" | "utm" | "jrl"
                    | "utw" | "pth" | "bti"
            )
        )
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.extension() {
            Some(ext) => f.write_str(ext),
            None => write!(f, "{}", self.0),
        }
    }
}

/// A resource name and type, like `appearance.2da`.
///
/// Names are case-insensitive and stored in lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceIdentifier {
    /// The resource name, without extension.
    pub resname: String,
    /// The resource type.
    pub restype: ResourceType,
}

/// Error for a file name that does not map to a resource.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0:?} is not a known resource file name")]
pub struct ParseResourceIdentifierError(String);

impl ResourceIdentifier {
    /// Create a resource identifier.
    pub fn new(resname: &str, restype: ResourceType) -> Self {
        Self {
            resname: resname.to_ascii_lowercase(),
            restype,
        }
    }

    /// Split a file name like `appearance.2da` into a resource identifier.
    ///
    /// ```rust
    /// use kotor_erf::{ResourceIdentifier, ResourceType};
    /// let ident = ResourceIdentifier::from_filename("Appearance.2DA").unwrap();
    /// assert_eq!(ident.resname, "appearance");
    /// assert_eq!(ident.restype, ResourceType::TWODA);
    /// assert!(ResourceIdentifier::from_filename("readme").is_err());
    /// ```
    pub fn from_filename(filename: &str) -> Result<Self, ParseResourceIdentifierError> {
        let (resname, extension) = filename
            .rsplit_once('.')
            .ok_or_else(|| ParseResourceIdentifierError(filename.to_string()))?;
        let restype = ResourceType::from_extension(extension)
            .ok_or_else(|| ParseResourceIdentifierError(filename.to_string()))?;
        Ok(Self::new(resname, restype))
    }
}

impl FromStr for ResourceIdentifier {
    type Err = ParseResourceIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_filename(s)
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resname, self.restype)
    }
}
