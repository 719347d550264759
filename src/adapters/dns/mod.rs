pub mod doh;
pub mod hickory;

/// Append the root dot so resolvers never apply search domains.
pub(crate) fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}
