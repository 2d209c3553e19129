//! Call data understood by the execution engine

use collector_types::{Address, Calldata, Wei};

use crate::abi::{
    address_from_word, decode_call, encode_call, selector, u128_from_word,
    u128_saturating_from_word, word_from_address, word_from_u128, word_from_wei, AbiWord,
};
use crate::error::CryptoError;

/// Solidity signature of the engine's purchase entry point
pub const BUY_FROM_NFT_MARKETPLACE_SIG: &str =
    "buyFromNftMarketplace(address,address,uint256,uint256)";
/// Solidity signature of a marketplace purchase
pub const MARKETPLACE_BUY_SIG: &str = "buy(address,uint256)";

/// The engine's own purchase entry point, reachable only as a self-call
/// from an executed proposal
///
/// Both integers travel as `uint256`. An `assetId` wider than 128 bits is
/// rejected as malformed; a wider `maxPrice` (such as the `type(uint256).max`
/// "no cap" sentinel) decodes as `u128::MAX`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuyFromMarketplace {
    /// Marketplace to buy from
    pub marketplace: Address,
    /// Asset collection
    pub collection: Address,
    /// Asset id within the collection
    pub asset_id: u128,
    /// Refuse the purchase if the listed price exceeds this
    pub max_price: Wei,
}

impl BuyFromMarketplace {
    pub fn selector() -> [u8; 4] {
        selector(BUY_FROM_NFT_MARKETPLACE_SIG)
    }

    pub fn encode(&self) -> Calldata {
        encode_call(
            Self::selector(),
            &[
                word_from_address(&self.marketplace),
                word_from_address(&self.collection),
                word_from_u128(self.asset_id),
                word_from_wei(self.max_price),
            ],
        )
    }

    pub fn decode(payload: &[u8]) -> Result<Self, CryptoError> {
        let words = expect_call(payload, Self::selector(), 4)?;
        Ok(Self {
            marketplace: address_from_word(&words[0])?,
            collection: address_from_word(&words[1])?,
            asset_id: u128_from_word(&words[2])?,
            max_price: Wei(u128_saturating_from_word(&words[3])),
        })
    }
}

/// A marketplace's `buy(address collection, uint256 assetId)`; the price is
/// carried as the call's value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketplaceBuy {
    /// Asset collection
    pub collection: Address,
    /// Asset id within the collection
    pub asset_id: u128,
}

impl MarketplaceBuy {
    pub fn selector() -> [u8; 4] {
        selector(MARKETPLACE_BUY_SIG)
    }

    pub fn encode(&self) -> Calldata {
        encode_call(
            Self::selector(),
            &[word_from_address(&self.collection), word_from_u128(self.asset_id)],
        )
    }

    pub fn decode(payload: &[u8]) -> Result<Self, CryptoError> {
        let words = expect_call(payload, Self::selector(), 2)?;
        Ok(Self {
            collection: address_from_word(&words[0])?,
            asset_id: u128_from_word(&words[1])?,
        })
    }
}

fn expect_call(payload: &[u8], expected: [u8; 4], arity: usize) -> Result<Vec<AbiWord>, CryptoError> {
    let (found, words) = decode_call(payload)?;
    if found != expected {
        return Err(CryptoError::UnknownSelector(found));
    }
    if words.len() != arity {
        return Err(CryptoError::MalformedCalldata(format!(
            "expected {} arguments, found {}",
            arity,
            words.len()
        )));
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase() -> BuyFromMarketplace {
        BuyFromMarketplace {
            marketplace: Address([1; 20]),
            collection: Address([2; 20]),
            asset_id: 1,
            max_price: Wei::ether(1000),
        }
    }

    #[test]
    fn test_buy_from_marketplace_layout() {
        let data = purchase().encode();
        assert_eq!(data.len(), 4 + 4 * 32);
        assert_eq!(&data.as_bytes()[..4], &BuyFromMarketplace::selector());
        assert_eq!(BuyFromMarketplace::decode(data.as_bytes()).unwrap(), purchase());
    }

    #[test]
    fn test_uncapped_max_price_saturates() {
        let mut data = purchase().encode().as_bytes().to_vec();
        let price = 4 + 3 * 32;
        data[price..price + 32].copy_from_slice(&[0xff; 32]);

        let decoded = BuyFromMarketplace::decode(&data).unwrap();
        assert_eq!(decoded.max_price, Wei(u128::MAX));

        let asset = 4 + 2 * 32;
        data[asset] = 1;
        assert!(matches!(
            BuyFromMarketplace::decode(&data),
            Err(CryptoError::MalformedCalldata(_))
        ));
    }

    #[test]
    fn test_wrong_selector_is_reported() {
        let data = MarketplaceBuy {
            collection: Address([2; 20]),
            asset_id: 9,
        }
        .encode();
        assert!(matches!(
            BuyFromMarketplace::decode(data.as_bytes()),
            Err(CryptoError::UnknownSelector(_))
        ));
    }

    #[test]
    fn test_truncated_arguments_rejected() {
        let data = purchase().encode();
        let truncated = &data.as_bytes()[..4 + 3 * 32];
        assert!(matches!(
            BuyFromMarketplace::decode(truncated),
            Err(CryptoError::MalformedCalldata(_))
        ));
    }
}
