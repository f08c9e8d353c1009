//! `fingerprint`: print pins for PEM certificates. No network.

use unipoll_api::PinnedFingerprints;

use crate::cli::FingerprintArgs;
use crate::error::CliError;

pub fn handle(args: &FingerprintArgs) -> Result<(), CliError> {
    for path in &args.files {
        let pem = std::fs::read(path)?;
        let pins = PinnedFingerprints::from_pem(&pem)?;
        for pin in pins.iter() {
            println!("{pin}  {}", path.display());
        }
    }
    Ok(())
}
