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

use base64::{
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
    DecodeError, Engine as _,
};

/// Returns the `base64url`-encoded string **without padding** of the given
/// `payload`.
pub fn base64_url_encode<T: AsRef<[u8]>>(payload: T) -> String {
    URL_SAFE_NO_PAD.encode(payload)
}

/// Decodes the given `payload` as the `base64url`-encoded string **without
/// padding** into bytes.
pub fn base64_url_decode<T: AsRef<[u8]>>(payload: T) -> Result<Vec<u8>, DecodeError> {
    URL_SAFE_NO_PAD.decode(payload)
}

/// Same as [`base64_url_decode`], but padded input is accepted as well.
///
/// Some wallets pad their `vp_token`s, so the verifier has to accept both forms.
pub fn base64_url_decode_lenient<T: AsRef<[u8]>>(payload: T) -> Result<Vec<u8>, DecodeError> {
    match base64_url_decode(payload.as_ref()) {
        Err(DecodeError::InvalidPadding) => URL_SAFE.decode(payload),
        result => result,
    }
}
