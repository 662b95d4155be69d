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

//! Util code over `coset` crate

use bherror::traits::{ErrorContext as _, ForeignError as _};
use coset::{
    iana::{Algorithm, Ec2KeyParameter, EllipticCurve},
    AsCborValue, CoseKey, KeyType, Label,
};
use openssl::pkey::{PKeyRef, Public};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::base64::{base64_url_decode, base64_url_encode};
use crate::{
    crypto::{ec_public_coordinates, SigningAlgorithm},
    error::{MdocError, Result},
};

/// JSON object holding a JWK.
pub type Jwk = serde_json::Map<String, serde_json::Value>;

/// The `COSE_Sign1` _CBOR_ tag, see [RFC 9052][1].
///
/// [1]: <https://www.rfc-editor.org/rfc/rfc9052.html#section-4.2>
const COSE_SIGN1_CBOR_TAG: u64 = 18;

pub(crate) fn serialize_coset<T, S>(
    cose_value: &T,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    T: AsCborValue + Clone,
    S: Serializer,
{
    let cbor_value = cose_value
        .clone()
        .to_cbor_value()
        .map_err(serde::ser::Error::custom)?;

    cbor_value.serialize(serializer)
}

pub(crate) fn deserialize_coset<'de, T, D>(deserializer: D) -> std::result::Result<T, D::Error>
where
    T: AsCborValue,
    D: Deserializer<'de>,
{
    let cbor_value = ciborium::Value::deserialize(deserializer)?;

    T::from_cbor_value(cbor_value).map_err(serde::de::Error::custom)
}

/// Same as [`deserialize_coset`], but accepts the `COSE_Sign1` wrapped in its _CBOR_ tag as well.
pub(crate) fn deserialize_cose_sign1<'de, D>(
    deserializer: D,
) -> std::result::Result<coset::CoseSign1, D::Error>
where
    D: Deserializer<'de>,
{
    let cbor_value = match ciborium::Value::deserialize(deserializer)? {
        ciborium::Value::Tag(COSE_SIGN1_CBOR_TAG, inner) => *inner,
        untagged => untagged,
    };

    coset::CoseSign1::from_cbor_value(cbor_value).map_err(serde::de::Error::custom)
}

/// The `COSE_Key` curve of the `algorithm`.
fn cose_curve(algorithm: SigningAlgorithm) -> EllipticCurve {
    match algorithm {
        SigningAlgorithm::Es256 => EllipticCurve::P_256,
        SigningAlgorithm::Es384 => EllipticCurve::P_384,
        SigningAlgorithm::Es512 => EllipticCurve::P_521,
    }
}

/// The JWK `crv` of the `algorithm`.
fn jwk_curve(algorithm: SigningAlgorithm) -> &'static str {
    match algorithm {
        SigningAlgorithm::Es256 => "P-256",
        SigningAlgorithm::Es384 => "P-384",
        SigningAlgorithm::Es512 => "P-521",
    }
}

/// Converts a JWK to the `COSE_Key`.
///
/// Only the `EC` keys over the `P-256`, `P-384` & `P-521` curves are supported.  The resulting
/// `COSE_Key` carries the curve, and no algorithm.  If the JWK has the `alg` parameter, it must be
/// the one implied by the curve.
///
/// For more details on `COSE_Key` look [here](https://datatracker.ietf.org/doc/html/rfc8152#section-13.1.1).
pub fn cose_key_from_jwk(jwk: &Jwk) -> Result<CoseKey> {
    let err = |message: String| bherror::Error::root(MdocError::JwkToCoseKey(message));

    if jwk.get("kty").and_then(|kty| kty.as_str()) != Some("EC") {
        return Err(err("Expected key kty with value EC".to_owned()));
    }

    let crv = jwk
        .get("crv")
        .and_then(|crv| crv.as_str())
        .ok_or_else(|| err("Missing key crv of type String".to_owned()))?;

    let algorithm = SigningAlgorithm::ALL
        .into_iter()
        .find(|algorithm| jwk_curve(*algorithm) == crv)
        .ok_or_else(|| err(format!("Unsupported curve {crv}")))?;

    if let Some(alg) = jwk.get("alg") {
        if alg.as_str() != Some(algorithm.to_string().as_str()) {
            return Err(err(format!("Algorithm {alg} does not match curve {crv}")));
        }
    }

    let x = extract_coord(jwk, "x", algorithm)?;
    let y = extract_coord(jwk, "y", algorithm)?;

    Ok(coset::CoseKeyBuilder::new_ec2_pub_key(cose_curve(algorithm), x, y).build())
}

/// Converts the EC `public_key` to the `COSE_Key`, in the same shape as [`cose_key_from_jwk`].
pub(crate) fn cose_key_from_public_key(public_key: &PKeyRef<Public>) -> Result<CoseKey> {
    let ec_key = public_key
        .ec_key()
        .foreign_err(|| MdocError::Crypto)
        .ctx(|| "only EC keys are supported")?;
    let (algorithm, x, y) = ec_public_coordinates(&ec_key)?;

    Ok(coset::CoseKeyBuilder::new_ec2_pub_key(cose_curve(algorithm), x, y).build())
}

/// Extract coordinates from JWK.
fn extract_coord(jwk: &Jwk, coord_key: &'static str, algorithm: SigningAlgorithm) -> Result<Vec<u8>> {
    let coord = jwk
        .get(coord_key)
        .and_then(|coord| coord.as_str())
        .ok_or_else(|| {
            bherror::Error::root(MdocError::JwkToCoseKey(format!(
                "Missing coordinate {coord_key} of type String"
            )))
        })?;

    let coord = base64_url_decode(coord).foreign_err(|| {
        MdocError::JwkToCoseKey(format!("Failed to decode coordinate {coord_key}"))
    })?;

    if coord.len() != algorithm.coordinate_len() {
        return Err(bherror::Error::root(MdocError::JwkToCoseKey(format!(
            "Coordinate {coord_key} MUST HAVE {} bytes",
            algorithm.coordinate_len()
        ))));
    }

    Ok(coord)
}

/// Converts the `COSE_Key` to JWK.
///
/// Only the `EC2` keys over the `P-256`, `P-384` & `P-521` curves are supported.  The `alg` of the
/// JWK is inferred from the curve.
pub fn cose_key_to_jwk(cose_key: &CoseKey) -> Result<Jwk> {
    if cose_key.kty != KeyType::Assigned(coset::iana::KeyType::EC2) {
        return Err(bherror::Error::root(MdocError::CoseKeyToJwk(
            "only EC keys are supported".to_owned(),
        )));
    }

    let curve = get_cose_key_param(cose_key, &Label::Int(Ec2KeyParameter::Crv as i64))?
        .as_integer()
        .and_then(|curve| i64::try_from(curve).ok());

    let algorithm = SigningAlgorithm::ALL
        .into_iter()
        .find(|algorithm| Some(cose_curve(*algorithm) as i64) == curve)
        .ok_or_else(|| {
            bherror::Error::root(MdocError::CoseKeyToJwk(
                "only P-256, P-384 & P-521 curves are supported".to_owned(),
            ))
        })?;

    let x = get_ec_key_param(cose_key, Ec2KeyParameter::X, algorithm)?;
    let y = get_ec_key_param(cose_key, Ec2KeyParameter::Y, algorithm)?;

    let mut jwk = Jwk::new();
    jwk.insert("kty".to_owned(), "EC".into());
    jwk.insert("crv".to_owned(), jwk_curve(algorithm).into());
    jwk.insert("x".to_owned(), base64_url_encode(x).into());
    jwk.insert("y".to_owned(), base64_url_encode(y).into());
    jwk.insert("alg".to_owned(), algorithm.to_string().into());

    Ok(jwk)
}

/// Returns the `EC` key parameter from the `params` attribute of the provided
/// `COSE_Key`.
///
/// Its value **MUST BE** a byte string of the coordinate length of the curve.
fn get_ec_key_param(
    cose_key: &CoseKey,
    param: Ec2KeyParameter,
    algorithm: SigningAlgorithm,
) -> Result<&[u8]> {
    let ciborium::Value::Bytes(value) = get_cose_key_param(cose_key, &Label::Int(param as i64))?
    else {
        return Err(bherror::Error::root(MdocError::CoseKeyToJwk(format!(
            "{:?} parameter MUST BE bytes",
            param
        ))));
    };

    if value.len() != algorithm.coordinate_len() {
        return Err(bherror::Error::root(MdocError::CoseKeyToJwk(format!(
            "{:?} MUST HAVE {} bytes",
            param,
            algorithm.coordinate_len()
        ))));
    }

    Ok(value.as_slice())
}

/// Returns the param with the given [`Label`] from the `params` attribute of
/// the provided `COSE_Key`.
///
/// If there are multiple entries with the given [`Label`], only the first-one
/// is returned.
fn get_cose_key_param<'a>(cose_key: &'a CoseKey, label: &Label) -> Result<&'a ciborium::Value> {
    cose_key
        .params
        .iter()
        .find_map(|(l, v)| (l == label).then_some(v))
        .ok_or_else(|| {
            bherror::Error::root(MdocError::CoseKeyToJwk(format!(
                "key param {:?} not found",
                label
            )))
        })
}

/// Maps the [`coset::Algorithm`] to the [`SigningAlgorithm`].
///
/// If the [`coset::Algorithm`] is not supported, [`None`] is returned.
pub(crate) fn coset_alg_to_signing_alg(alg: &Algorithm) -> Option<SigningAlgorithm> {
    Some(match alg {
        Algorithm::ES256 => SigningAlgorithm::Es256,
        Algorithm::ES384 => SigningAlgorithm::Es384,
        Algorithm::ES512 => SigningAlgorithm::Es512,
        _ => return None,
    })
}

/// Maps the [`SigningAlgorithm`] to the [`Algorithm`].
pub(crate) fn signing_alg_to_coset_alg(alg: SigningAlgorithm) -> Algorithm {
    match alg {
        SigningAlgorithm::Es256 => Algorithm::ES256,
        SigningAlgorithm::Es384 => Algorithm::ES384,
        SigningAlgorithm::Es512 => Algorithm::ES512,
    }
}
