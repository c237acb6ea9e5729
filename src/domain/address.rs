//! 地址编码器与私钥序列化
//!
//! 每个 (链, 格式) 一个编码器。输入是密钥树或随机生成器给出的合法密钥，
//! 编码本身不应失败；失败说明曲线与格式不匹配

use bitcoin::secp256k1::{Secp256k1, XOnlyPublicKey};
use bitcoin::{Address, Network, PrivateKey, PublicKey as BitcoinPublicKey};
use sha3::{Digest, Keccak256};

use crate::domain::chain_config::{AddressFormat, PrivateKeyEncoding};
use crate::domain::key_tree::{Ed25519KeyPair, KeyPair, Secp256k1KeyPair};
use crate::error::{KeygenError, KeygenResult};

/// 主网
const BITCOIN_NETWORK: Network = Network::Bitcoin;

/// 一个 (格式, 索引) 的输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRecord {
    pub address: String,
    pub private_key: String,
}

pub struct AddressEncoder;

impl AddressEncoder {
    /// 生成地址并按链约定序列化私钥
    pub fn encode(keypair: &KeyPair, format: AddressFormat) -> KeygenResult<AddressRecord> {
        Ok(AddressRecord {
            address: Self::encode_address(keypair, format)?,
            private_key: Self::serialize_private_key(keypair, format.private_key_encoding())?,
        })
    }

    pub fn encode_address(keypair: &KeyPair, format: AddressFormat) -> KeygenResult<String> {
        match (format, keypair) {
            (AddressFormat::P2pkh, KeyPair::Secp256k1(kp)) => {
                let pubkey = Self::bitcoin_public_key(kp)?;
                Ok(Address::p2pkh(&pubkey, BITCOIN_NETWORK).to_string())
            }
            (AddressFormat::P2shP2wpkh, KeyPair::Secp256k1(kp)) => {
                let pubkey = Self::bitcoin_public_key(kp)?;
                let address = Address::p2shwpkh(&pubkey, BITCOIN_NETWORK).map_err(|e| {
                    KeygenError::Encoding(format!("P2SH-P2WPKH address failed: {}", e))
                })?;
                Ok(address.to_string())
            }
            (AddressFormat::P2wpkh, KeyPair::Secp256k1(kp)) => {
                let pubkey = Self::bitcoin_public_key(kp)?;
                let address = Address::p2wpkh(&pubkey, BITCOIN_NETWORK).map_err(|e| {
                    KeygenError::Encoding(format!("P2WPKH address failed: {}", e))
                })?;
                Ok(address.to_string())
            }
            (AddressFormat::P2tr, KeyPair::Secp256k1(kp)) => {
                Self::taproot_address(&kp.compressed_public_key())
            }
            (AddressFormat::Ethereum, KeyPair::Secp256k1(kp)) => {
                Self::ethereum_address(&kp.uncompressed_public_key())
            }
            (AddressFormat::Solana, KeyPair::Ed25519(kp)) => Ok(Self::solana_address(kp)),
            (format, keypair) => Err(KeygenError::Encoding(format!(
                "{} address cannot be built from a {:?} key",
                format,
                keypair.curve_type()
            ))),
        }
    }

    pub fn serialize_private_key(
        keypair: &KeyPair,
        encoding: PrivateKeyEncoding,
    ) -> KeygenResult<String> {
        match (encoding, keypair) {
            (PrivateKeyEncoding::Wif, KeyPair::Secp256k1(kp)) => {
                let secret = kp.secret_bytes();
                let private_key = PrivateKey::from_slice(&secret[..], BITCOIN_NETWORK)
                    .map_err(|e| KeygenError::Encoding(format!("WIF encoding failed: {}", e)))?;
                Ok(private_key.to_wif())
            }
            (PrivateKeyEncoding::Hex, KeyPair::Secp256k1(kp)) => {
                Ok(format!("0x{}", hex::encode(&kp.secret_bytes()[..])))
            }
            (PrivateKeyEncoding::Base58, KeyPair::Ed25519(kp)) => {
                Ok(bs58::encode(&kp.keypair_bytes()[..]).into_string())
            }
            (encoding, keypair) => Err(KeygenError::Encoding(format!(
                "{:?} serialization is not defined for {:?} keys",
                encoding,
                keypair.curve_type()
            ))),
        }
    }

    /// Taproot 使用 x-only 公钥：33 字节压缩公钥去掉首个奇偶字节
    pub fn to_x_only(public_key: &[u8]) -> &[u8] {
        if public_key.len() == 33 {
            &public_key[1..]
        } else {
            public_key
        }
    }

    /// P2TR，内部公钥按 BIP86 做无脚本树的 tweak
    pub fn taproot_address(public_key: &[u8]) -> KeygenResult<String> {
        let secp = Secp256k1::verification_only();
        let internal_key = XOnlyPublicKey::from_slice(Self::to_x_only(public_key))
            .map_err(|e| KeygenError::Encoding(format!("Invalid x-only public key: {}", e)))?;
        Ok(Address::p2tr(&secp, internal_key, None, BITCOIN_NETWORK).to_string())
    }

    /// Keccak256(X || Y) 后 20 字节，EIP-55 大小写校验
    pub fn ethereum_address(uncompressed_public_key: &[u8]) -> KeygenResult<String> {
        if uncompressed_public_key.len() != 65 || uncompressed_public_key[0] != 0x04 {
            return Err(KeygenError::Encoding(
                "Ethereum address requires a 65-byte uncompressed public key".to_string(),
            ));
        }

        let hash = Keccak256::digest(&uncompressed_public_key[1..]);
        Ok(to_checksum_address(&hex::encode(&hash[12..])))
    }

    pub fn solana_address(keypair: &Ed25519KeyPair) -> String {
        bs58::encode(keypair.public_key()).into_string()
    }

    fn bitcoin_public_key(keypair: &Secp256k1KeyPair) -> KeygenResult<BitcoinPublicKey> {
        BitcoinPublicKey::from_slice(&keypair.compressed_public_key())
            .map_err(|e| KeygenError::Encoding(format!("Invalid secp256k1 public key: {}", e)))
    }
}

/// EIP-55：对小写地址做 Keccak256，哈希半字节 >= 8 的字母位大写
fn to_checksum_address(lower_hex: &str) -> String {
    let hash = hex::encode(Keccak256::digest(lower_hex.as_bytes()));

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (c, h) in lower_hex.chars().zip(hash.chars()) {
        let nibble = h.to_digit(16).unwrap_or(0);
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain_config::CurveType;
    use crate::domain::key_tree::KeyTreeFactory;

    #[test]
    fn test_eip55_reference_vectors() {
        // EIP-55 规范中的示例
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let lower = expected[2..].to_lowercase();
            assert_eq!(to_checksum_address(&lower), expected);
        }
    }

    #[test]
    fn test_x_only_drops_parity_byte() {
        let mut compressed = vec![0x02];
        compressed.extend_from_slice(&[7u8; 32]);
        assert_eq!(AddressEncoder::to_x_only(&compressed), &[7u8; 32][..]);
        assert_eq!(AddressEncoder::to_x_only(&[9u8; 32]), &[9u8; 32][..]);
    }

    #[test]
    fn test_bitcoin_prefixes_for_random_key() {
        let kp = KeyTreeFactory::random_keypair(CurveType::Secp256k1);
        let prefixes = [
            (AddressFormat::P2pkh, "1"),
            (AddressFormat::P2shP2wpkh, "3"),
            (AddressFormat::P2wpkh, "bc1q"),
            (AddressFormat::P2tr, "bc1p"),
        ];
        for (format, prefix) in prefixes {
            let record = AddressEncoder::encode(&kp, format).unwrap();
            assert!(record.address.starts_with(prefix), "{}", record.address);
            // 压缩公钥 WIF 以 K 或 L 开头
            assert!(record.private_key.starts_with('K') || record.private_key.starts_with('L'));
        }
    }

    #[test]
    fn test_ethereum_record_shape() {
        let kp = KeyTreeFactory::random_keypair(CurveType::Secp256k1);
        let record = AddressEncoder::encode(&kp, AddressFormat::Ethereum).unwrap();
        assert_eq!(record.address.len(), 42);
        assert!(record.address.starts_with("0x"));
        assert!(record.address[2..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(record.private_key.len(), 66);
        assert!(record.private_key.starts_with("0x"));
    }

    #[test]
    fn test_solana_record_shape() {
        let kp = KeyTreeFactory::random_keypair(CurveType::Ed25519);
        let record = AddressEncoder::encode(&kp, AddressFormat::Solana).unwrap();
        let pubkey = bs58::decode(&record.address).into_vec().unwrap();
        assert_eq!(pubkey.len(), 32);
        let secret = bs58::decode(&record.private_key).into_vec().unwrap();
        assert_eq!(secret.len(), 64);
        assert_eq!(&secret[32..], &pubkey[..]);
    }

    #[test]
    fn test_curve_mismatch_is_rejected() {
        let ed = KeyTreeFactory::random_keypair(CurveType::Ed25519);
        assert!(matches!(
            AddressEncoder::encode(&ed, AddressFormat::P2pkh),
            Err(KeygenError::Encoding(_))
        ));

        let secp = KeyTreeFactory::random_keypair(CurveType::Secp256k1);
        assert!(matches!(
            AddressEncoder::encode(&secp, AddressFormat::Solana),
            Err(KeygenError::Encoding(_))
        ));
    }

    #[test]
    fn test_wif_decodes_to_same_scalar() {
        let kp = KeyTreeFactory::random_keypair(CurveType::Secp256k1);
        let wif = AddressEncoder::serialize_private_key(&kp, PrivateKeyEncoding::Wif).unwrap();
        let decoded = PrivateKey::from_wif(&wif).unwrap();
        assert!(decoded.compressed);
        match &kp {
            KeyPair::Secp256k1(inner) => {
                assert_eq!(decoded.inner.secret_bytes(), *inner.secret_bytes());
            }
            KeyPair::Ed25519(_) => unreachable!(),
        }
    }
}
