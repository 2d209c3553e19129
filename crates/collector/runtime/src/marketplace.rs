//! Asset marketplace collaborator
//!
//! The engine only ever invokes a marketplace through [`NftMarketplace`];
//! it never hands out access to its own state. Marketplaces are cloned
//! into the staged environment during execution, so implementations must
//! be cheap to `box_clone`.

use collector_types::{Address, Wei};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Reasons a marketplace refuses a purchase
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketplaceError {
    #[error("asset {collection}#{asset_id} is not listed")]
    NotListed { collection: Address, asset_id: u128 },

    #[error("payment {offered} is below asking price {price}")]
    InsufficientPayment { price: Wei, offered: Wei },
}

/// A marketplace selling unique assets identified by `(collection, asset_id)`
pub trait NftMarketplace: Send + Sync + std::fmt::Debug {
    /// Address the marketplace is reachable at
    fn address(&self) -> Address;

    /// Current asking price of a listed asset
    fn price_of(&self, collection: &Address, asset_id: u128) -> Result<Wei, MarketplaceError>;

    /// Transfer custody to `buyer` against `payment`; returns the amount taken
    fn buy(
        &mut self,
        buyer: Address,
        collection: &Address,
        asset_id: u128,
        payment: Wei,
    ) -> Result<Wei, MarketplaceError>;

    fn owner_of(&self, collection: &Address, asset_id: u128) -> Option<Address>;

    fn box_clone(&self) -> Box<dyn NftMarketplace>;
}

impl Clone for Box<dyn NftMarketplace> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Listing {
    price: Wei,
    seller: Address,
}

/// Marketplace that keeps listings and ownership in memory
#[derive(Clone, Debug)]
pub struct InMemoryMarketplace {
    address: Address,
    listings: BTreeMap<(Address, u128), Listing>,
    owners: BTreeMap<(Address, u128), Address>,
    proceeds: BTreeMap<Address, Wei>,
}

impl InMemoryMarketplace {
    /// Empty marketplace deployed at `address`
    pub fn new(address: Address) -> Self {
        Self {
            address,
            listings: BTreeMap::new(),
            owners: BTreeMap::new(),
            proceeds: BTreeMap::new(),
        }
    }

    /// Offer an asset owned by `seller` for `price`
    pub fn list(&mut self, collection: Address, asset_id: u128, price: Wei, seller: Address) {
        self.owners.insert((collection, asset_id), seller);
        self.listings
            .insert((collection, asset_id), Listing { price, seller });
    }

    /// Builder form of [`list`](Self::list)
    pub fn with_listing(mut self, collection: Address, asset_id: u128, price: Wei, seller: Address) -> Self {
        self.list(collection, asset_id, price, seller);
        self
    }

    /// Whether the asset is currently for sale
    pub fn is_listed(&self, collection: &Address, asset_id: u128) -> bool {
        self.listings.contains_key(&(*collection, asset_id))
    }

    /// Total paid out to `seller` so far
    pub fn proceeds_of(&self, seller: &Address) -> Wei {
        self.proceeds.get(seller).copied().unwrap_or_default()
    }
}

impl NftMarketplace for InMemoryMarketplace {
    fn address(&self) -> Address {
        self.address
    }

    fn price_of(&self, collection: &Address, asset_id: u128) -> Result<Wei, MarketplaceError> {
        self.listings
            .get(&(*collection, asset_id))
            .map(|l| l.price)
            .ok_or(MarketplaceError::NotListed {
                collection: *collection,
                asset_id,
            })
    }

    fn buy(
        &mut self,
        buyer: Address,
        collection: &Address,
        asset_id: u128,
        payment: Wei,
    ) -> Result<Wei, MarketplaceError> {
        let key = (*collection, asset_id);
        let listing = self
            .listings
            .get(&key)
            .cloned()
            .ok_or(MarketplaceError::NotListed {
                collection: *collection,
                asset_id,
            })?;

        if payment < listing.price {
            return Err(MarketplaceError::InsufficientPayment {
                price: listing.price,
                offered: payment,
            });
        }

        self.listings.remove(&key);
        self.owners.insert(key, buyer);
        let earned = self.proceeds.entry(listing.seller).or_default();
        *earned = earned.saturating_add(payment);

        debug!(
            marketplace = %self.address,
            collection = %collection,
            asset_id,
            buyer = %buyer,
            payment = %payment,
            "Asset sold"
        );

        Ok(payment)
    }

    fn owner_of(&self, collection: &Address, asset_id: u128) -> Option<Address> {
        self.owners.get(&(*collection, asset_id)).copied()
    }

    fn box_clone(&self) -> Box<dyn NftMarketplace> {
        Box::new(self.clone())
    }
}
