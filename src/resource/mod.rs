pub mod meta;
pub mod relationship;
pub mod traits;

pub use meta::*;
pub use relationship::*;
pub use traits::*;

/// Separator between a fully qualified type and an identifier,
/// e.g. `org.acme.mynetwork.Commodity#EMA`.
pub const IDENTIFIER_SEPARATOR: char = '#';

/// Scheme prefix of a serialized relationship,
/// e.g. `resource:org.acme.mynetwork.Trader#dan@email.com`.
pub const RESOURCE_SCHEME: &str = "resource:";

pub fn fully_qualified_identifier(fully_qualified_type: &str, id: &str) -> String {
    format!("{}{}{}", fully_qualified_type, IDENTIFIER_SEPARATOR, id)
}
