// Copyright (C) 2020-2026  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::cmp::Ordering;

use bherror::traits::{ErrorContext as _, ForeignError as _};
use openssl::{asn1::Asn1Time, x509::X509};

use crate::{x5chain::clean_up_after_openssl, Error, Result};

/// Default tolerance, in seconds, for clock differences between the verifier and the issuer.
pub const DEFAULT_CLOCK_SKEW_SECONDS: u64 = 60;

/// Options of the [`verify_x5chain`] function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOptions {
    /// The time, as a UNIX timestamp, against which the validity periods of the certificates are
    /// checked.
    ///
    /// If [`None`], the validity periods are not checked.
    pub now: Option<i64>,
    /// Tolerance, in seconds, applied to both ends of each validity period.
    pub clock_skew_seconds: u64,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            now: None,
            clock_skew_seconds: DEFAULT_CLOCK_SKEW_SECONDS,
        }
    }
}

impl VerifyOptions {
    /// Options checking the validity periods against `now`, with the default clock skew.
    pub fn at(now: i64) -> Self {
        Self {
            now: Some(now),
            ..Default::default()
        }
    }
}

/// Verifies an ordered certificate chain, starting at the leaf.
///
/// For every certificate, in order:
///
///   1. its `notBefore` must not be after `now + skew`;
///   2. `now` must not be after its `notAfter + skew`;
///   3. it must be signed by the key of the next certificate in the chain, or, for the last one,
///      by its own key.
///
/// The first failing check is reported as [`Error::NotYetValid`], [`Error::Expired`] or
/// [`Error::InvalidSignature`] carrying the index of the certificate.
///
/// The chain is not reordered, nor is it checked against any trusted root.  Use
/// [`X5Chain::verify_against_trusted_roots`][crate::X5Chain::verify_against_trusted_roots] for
/// the latter.
pub fn verify_x5chain(certificates: &[X509], options: &VerifyOptions) -> Result<()> {
    if certificates.is_empty() {
        return Err(bherror::Error::root(Error::X5Chain).ctx("chain is empty"));
    }

    let window = options
        .now
        .map(|now| ValidityWindow::new(now, options.clock_skew_seconds))
        .transpose()?;

    for (index, certificate) in certificates.iter().enumerate() {
        if let Some(window) = &window {
            window.check(index, certificate)?;
        }

        let issuer = certificates.get(index + 1).unwrap_or(certificate);

        let is_signed = clean_up_after_openssl(|| certificate.verify(issuer.public_key()?.as_ref()))
            .foreign_err(|| Error::InvalidSignature(index))?;

        if !is_signed {
            return Err(bherror::Error::root(Error::InvalidSignature(index)));
        }
    }

    Ok(())
}

/// The `[now - skew, now + skew]` bounds the validity periods are compared against.
struct ValidityWindow {
    earliest: Asn1Time,
    latest: Asn1Time,
}

impl ValidityWindow {
    fn new(now: i64, clock_skew_seconds: u64) -> Result<Self> {
        let skew = i64::try_from(clock_skew_seconds)
            .foreign_err(|| Error::X5Chain)
            .ctx(|| "clock skew out of range")?;

        let bound = |time: Option<i64>| -> Result<Asn1Time> {
            let time = time.ok_or_else(|| {
                bherror::Error::root(Error::X5Chain).ctx("verification time out of range")
            })?;
            Asn1Time::from_unix(time).foreign_err(|| Error::X5Chain)
        };

        Ok(Self {
            earliest: bound(now.checked_sub(skew))?,
            latest: bound(now.checked_add(skew))?,
        })
    }

    fn check(&self, index: usize, certificate: &X509) -> Result<()> {
        let not_before = clean_up_after_openssl(|| certificate.not_before().compare(&self.latest))
            .foreign_err(|| Error::NotYetValid(index))?;
        if not_before == Ordering::Greater {
            return Err(bherror::Error::root(Error::NotYetValid(index))
                .ctx(format!("notBefore = {}", certificate.not_before())));
        }

        let not_after = clean_up_after_openssl(|| certificate.not_after().compare(&self.earliest))
            .foreign_err(|| Error::Expired(index))?;
        if not_after == Ordering::Less {
            return Err(bherror::Error::root(Error::Expired(index))
                .ctx(format!("notAfter = {}", certificate.not_after())));
        }

        Ok(())
    }
}
