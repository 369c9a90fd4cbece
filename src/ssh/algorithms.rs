//! SSH algorithm preferences.
//!
//! Each negotiable algorithm category (key exchange, cipher, server host key,
//! MAC, compression) is modeled as an enum with a `Default` sentinel. The
//! sentinel means "leave this category to normal negotiation"; any other
//! variant constrains negotiation to exactly that one algorithm.
//!
//! The variant sets are scoped to what russh can actually negotiate, so an
//! override always maps to a concrete russh name constant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when an algorithm name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAlgorithm(pub String);

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown algorithm name: {}", self.0)
    }
}

impl std::error::Error for UnknownAlgorithm {}

macro_rules! algorithm_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            /// Leave this category to default negotiation.
            #[serde(rename = "default")]
            Default,
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// The wire name of this algorithm, as it appears in SSH negotiation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    Self::Default => "default",
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::Default
            }
        }

        impl FromStr for $name {
            type Err = UnknownAlgorithm;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    "" | "default" => Ok(Self::Default),
                    $($wire => Ok(Self::$variant),)+
                    other => Err(UnknownAlgorithm(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

algorithm_enum! {
    /// Key exchange algorithm preference.
    KexAlgorithm {
        Curve25519Sha256 => "curve25519-sha256",
        Curve25519Sha256Libssh => "curve25519-sha256@libssh.org",
        EcdhSha2Nistp256 => "ecdh-sha2-nistp256",
        EcdhSha2Nistp384 => "ecdh-sha2-nistp384",
        EcdhSha2Nistp521 => "ecdh-sha2-nistp521",
        DhGroupExchangeSha256 => "diffie-hellman-group-exchange-sha256",
        DhGroup14Sha256 => "diffie-hellman-group14-sha256",
        DhGroup16Sha512 => "diffie-hellman-group16-sha512",
        DhGroupExchangeSha1 => "diffie-hellman-group-exchange-sha1",
        DhGroup14Sha1 => "diffie-hellman-group14-sha1",
        DhGroup1Sha1 => "diffie-hellman-group1-sha1",
    }
}

algorithm_enum! {
    /// Cipher algorithm preference.
    CipherAlgorithm {
        Chacha20Poly1305 => "chacha20-poly1305@openssh.com",
        Aes256Gcm => "aes256-gcm@openssh.com",
        Aes128Gcm => "aes128-gcm@openssh.com",
        Aes256Ctr => "aes256-ctr",
        Aes192Ctr => "aes192-ctr",
        Aes128Ctr => "aes128-ctr",
        Aes256Cbc => "aes256-cbc",
        Aes192Cbc => "aes192-cbc",
        Aes128Cbc => "aes128-cbc",
    }
}

algorithm_enum! {
    /// Server host key algorithm preference.
    HostKeyAlgorithm {
        SshEd25519 => "ssh-ed25519",
        EcdsaSha2Nistp256 => "ecdsa-sha2-nistp256",
        EcdsaSha2Nistp384 => "ecdsa-sha2-nistp384",
        EcdsaSha2Nistp521 => "ecdsa-sha2-nistp521",
        RsaSha2_512 => "rsa-sha2-512",
        RsaSha2_256 => "rsa-sha2-256",
        SshRsa => "ssh-rsa",
    }
}

algorithm_enum! {
    /// MAC algorithm preference.
    HmacAlgorithm {
        HmacSha2_256Etm => "hmac-sha2-256-etm@openssh.com",
        HmacSha2_512Etm => "hmac-sha2-512-etm@openssh.com",
        HmacSha1Etm => "hmac-sha1-etm@openssh.com",
        HmacSha2_256 => "hmac-sha2-256",
        HmacSha2_512 => "hmac-sha2-512",
        HmacSha1 => "hmac-sha1",
    }
}

algorithm_enum! {
    /// Compression algorithm preference.
    CompressionAlgorithm {
        None => "none",
        Zlib => "zlib",
    }
}

impl KexAlgorithm {
    /// Map to the russh name constant, or `None` for the default sentinel.
    pub(crate) fn to_russh(self) -> Option<russh::kex::Name> {
        match self {
            Self::Default => None,
            Self::Curve25519Sha256 => Some(russh::kex::CURVE25519),
            Self::Curve25519Sha256Libssh => Some(russh::kex::CURVE25519_PRE_RFC_8731),
            Self::EcdhSha2Nistp256 => Some(russh::kex::ECDH_SHA2_NISTP256),
            Self::EcdhSha2Nistp384 => Some(russh::kex::ECDH_SHA2_NISTP384),
            Self::EcdhSha2Nistp521 => Some(russh::kex::ECDH_SHA2_NISTP521),
            Self::DhGroupExchangeSha256 => Some(russh::kex::DH_GEX_SHA256),
            Self::DhGroup14Sha256 => Some(russh::kex::DH_G14_SHA256),
            Self::DhGroup16Sha512 => Some(russh::kex::DH_G16_SHA512),
            Self::DhGroupExchangeSha1 => Some(russh::kex::DH_GEX_SHA1),
            Self::DhGroup14Sha1 => Some(russh::kex::DH_G14_SHA1),
            Self::DhGroup1Sha1 => Some(russh::kex::DH_G1_SHA1),
        }
    }
}

impl CipherAlgorithm {
    pub(crate) fn to_russh(self) -> Option<russh::cipher::Name> {
        match self {
            Self::Default => None,
            Self::Chacha20Poly1305 => Some(russh::cipher::CHACHA20_POLY1305),
            Self::Aes256Gcm => Some(russh::cipher::AES_256_GCM),
            Self::Aes128Gcm => Some(russh::cipher::AES_128_GCM),
            Self::Aes256Ctr => Some(russh::cipher::AES_256_CTR),
            Self::Aes192Ctr => Some(russh::cipher::AES_192_CTR),
            Self::Aes128Ctr => Some(russh::cipher::AES_128_CTR),
            Self::Aes256Cbc => Some(russh::cipher::AES_256_CBC),
            Self::Aes192Cbc => Some(russh::cipher::AES_192_CBC),
            Self::Aes128Cbc => Some(russh::cipher::AES_128_CBC),
        }
    }
}

impl HostKeyAlgorithm {
    pub(crate) fn to_russh(self) -> Option<russh::keys::Algorithm> {
        use russh::keys::{Algorithm, EcdsaCurve, HashAlg};

        match self {
            Self::Default => None,
            Self::SshEd25519 => Some(Algorithm::Ed25519),
            Self::EcdsaSha2Nistp256 => Some(Algorithm::Ecdsa {
                curve: EcdsaCurve::NistP256,
            }),
            Self::EcdsaSha2Nistp384 => Some(Algorithm::Ecdsa {
                curve: EcdsaCurve::NistP384,
            }),
            Self::EcdsaSha2Nistp521 => Some(Algorithm::Ecdsa {
                curve: EcdsaCurve::NistP521,
            }),
            Self::RsaSha2_512 => Some(Algorithm::Rsa {
                hash: Some(HashAlg::Sha512),
            }),
            Self::RsaSha2_256 => Some(Algorithm::Rsa {
                hash: Some(HashAlg::Sha256),
            }),
            Self::SshRsa => Some(Algorithm::Rsa { hash: None }),
        }
    }
}

impl HmacAlgorithm {
    pub(crate) fn to_russh(self) -> Option<russh::mac::Name> {
        match self {
            Self::Default => None,
            Self::HmacSha2_256Etm => Some(russh::mac::HMAC_SHA256_ETM),
            Self::HmacSha2_512Etm => Some(russh::mac::HMAC_SHA512_ETM),
            Self::HmacSha1Etm => Some(russh::mac::HMAC_SHA1_ETM),
            Self::HmacSha2_256 => Some(russh::mac::HMAC_SHA256),
            Self::HmacSha2_512 => Some(russh::mac::HMAC_SHA512),
            Self::HmacSha1 => Some(russh::mac::HMAC_SHA1),
        }
    }
}
