/// Namespace bound to the reserved `xml` prefix.
pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace bound to the reserved `xmlns` prefix.
pub const XMLNS_URI: &str = "http://www.w3.org/2000/xmlns/";

/// Key index name reserved for the `id()` function. User `<xsl:key>` names are QNames and
/// can never start with `#`.
pub const ID_INDEX_NAME: &str = "##id";

/// First compiled-translet version that ships split name/URI/type arrays.
pub const VER_SPLIT_NAMES_ARRAY: u32 = 101;

/// Newest compiled-translet version this runtime can execute.
pub const CURRENT_TRANSLET_VERSION: u32 = VER_SPLIT_NAMES_ARRAY;

/// Plain (non-exponent) number formatting applies for magnitudes in `[LOWER, UPPER)`.
pub const PLAIN_NUMBER_LOWER_BOUND: f64 = 0.001;
pub const PLAIN_NUMBER_UPPER_BOUND: f64 = 10_000_000.0;

/// Maximum number of fraction digits produced by the wide number formatter.
pub const MAX_FRACTION_DIGITS: usize = 340;
