pub mod card;
pub mod console;
pub mod session;
pub mod store;
pub mod transfer;

pub use card::Card;
pub use session::Session;
pub use store::{CardStore, Hardest, StoreError, Verdict};

use log::*;
use std::ffi::{OsStr, OsString};

const IMPORT_FLAGS: [&str; 2] = ["-import", "--import"];
const EXPORT_FLAGS: [&str; 2] = ["-export", "--export"];

/// Value of the last `<flag> <value>` or `--flag=<value>` in `args`.
///
/// Every occurrence is looked at, so a value may itself be another flag.
fn last_value<'a>(args: &'a [OsString], flags: &[&str]) -> Option<&'a OsStr> {
    let long = format!("{}=", flags[flags.len() - 1]);
    let mut found = None;
    for (i, arg) in args.iter().enumerate() {
        let Some(s) = arg.to_str() else { continue };
        if flags.contains(&s) {
            if let Some(value) = args.get(i + 1) {
                found = Some(value.as_os_str());
            }
        } else if let Some(value) = s.strip_prefix(&long) {
            found = Some(OsStr::new(value));
        }
    }
    found
}

/// Keep only the arguments the binary understands.
///
/// `-import` and `-export` are each scanned for on their own and the last
/// value wins; the result holds at most one `--import=<file>` and one
/// `--export=<file>`. Anything unrecognised is dropped.
pub fn filter_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let mut kept: Vec<OsString> = args.next().into_iter().collect();
    let rest: Vec<OsString> = args.collect();

    for (flags, long) in [(IMPORT_FLAGS, "--import="), (EXPORT_FLAGS, "--export=")] {
        if let Some(value) = last_value(&rest, &flags) {
            let mut flag = OsString::from(long);
            flag.push(value);
            kept.push(flag);
        }
    }
    for arg in &rest {
        match arg.to_str() {
            Some("-h" | "--help" | "-V" | "--version") => kept.push(arg.clone()),
            _ => debug!("ignoring argument {:?}", arg),
        }
    }
    kept
}
