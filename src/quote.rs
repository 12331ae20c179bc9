//! Quote types and assembly (spec §4.7): per-route fee/price-impact, and the
//! exact-in/exact-out inversion law.

use crate::denom::{Denom, DenomCoin};
use crate::pool_store::Snapshot;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One pool transition as it appears in a finished quote, carrying enough of
/// the pool's fee terms to reconstruct `prepare_result`'s fee aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotePoolLeg {
    pub pool_id: crate::pool::PoolId,
    pub token_in: Denom,
    pub token_out: Denom,
    pub spread_factor: Decimal,
    pub taker_fee: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRoute {
    pub legs: Vec<QuotePoolLeg>,
    pub amount_in: u128,
    pub amount_out: u128,
}

impl QuoteRoute {
    /// `fee_r = 1 - Π_p (1 - spread_p - taker_p)` (spec §4.7).
    pub fn effective_fee(&self) -> Decimal {
        let product = self
            .legs
            .iter()
            .fold(Decimal::ONE, |acc, leg| acc * (Decimal::ONE - leg.spread_factor - leg.taker_fee));
        Decimal::ONE - product
    }
}

/// Host-facing result of a quote request. Implements [`serde::Serialize`] so
/// a caller can log it as structured text for debugging (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub input: DenomCoin,
    pub output_denom: Denom,
    pub amount_out: u128,
    pub routes: Vec<QuoteRoute>,
    pub effective_fee: Decimal,
    pub price_impact: Decimal,
    pub spot_price: Decimal,
}

impl Quote {
    pub fn single_route(input: DenomCoin, output_denom: Denom, route: QuoteRoute) -> Self {
        let amount_out = route.amount_out;
        Self {
            input,
            output_denom,
            amount_out,
            routes: vec![route],
            effective_fee: Decimal::ZERO,
            price_impact: Decimal::ZERO,
            spot_price: Decimal::ZERO,
        }
    }

    /// Inverts an exact-in quote into its exact-out presentation: swaps
    /// in/out amounts at quote, route and pool level, and clears the
    /// token-out on each leg (replacing it with the in-denom), leaving route
    /// order unchanged (spec §4.7 "Inversion for exact-out").
    pub fn invert(self) -> Quote {
        let new_output_denom = self.input.denom.clone();
        let new_amount_out = self.input.amount;
        let new_input = DenomCoin::new(self.output_denom.clone(), self.amount_out);

        let routes = self
            .routes
            .into_iter()
            .map(|r| {
                let inverted_legs = r
                    .legs
                    .into_iter()
                    .rev()
                    .map(|leg| QuotePoolLeg {
                        pool_id: leg.pool_id,
                        token_in: leg.token_out.clone(),
                        token_out: leg.token_in.clone(),
                        spread_factor: leg.spread_factor,
                        taker_fee: leg.taker_fee,
                    })
                    .collect();
                QuoteRoute { legs: inverted_legs, amount_in: r.amount_out, amount_out: r.amount_in }
            })
            .collect();

        Quote {
            input: new_input,
            output_denom: new_output_denom,
            amount_out: new_amount_out,
            routes,
            effective_fee: self.effective_fee,
            price_impact: self.price_impact,
            spot_price: self.spot_price,
        }
    }
}

/// Completes a quote for delivery: aggregate fee and price-impact weighted
/// pro-rata by each route's share of the total input (spec §4.7
/// `prepare_result`). `route_spot_prices` must be in the same order as
/// `quote.routes` and is the per-route spot price the simulator reported.
pub fn prepare_result(mut quote: Quote, route_spot_prices: &[Decimal], overall_spot: Decimal) -> Quote {
    let total_in: u128 = quote.routes.iter().map(|r| r.amount_in).sum();
    if total_in == 0 {
        quote.effective_fee = Decimal::ZERO;
        quote.price_impact = Decimal::ZERO;
        quote.spot_price = overall_spot;
        return quote;
    }

    let mut aggregate_fee = Decimal::ZERO;
    let mut weighted_spot = Decimal::ZERO;
    for (route, &spot) in quote.routes.iter().zip(route_spot_prices) {
        let fraction = Decimal::from(route.amount_in as u64) / Decimal::from(total_in as u64);
        aggregate_fee += route.effective_fee() * fraction;
        weighted_spot += spot * fraction;
    }

    quote.effective_fee = aggregate_fee;
    quote.spot_price = overall_spot;
    quote.price_impact = if overall_spot.is_zero() {
        Decimal::ZERO
    } else {
        weighted_spot / overall_spot - Decimal::ONE
    };
    quote
}

/// Looks up a pool in `snapshot` and builds the `QuotePoolLeg` for one hop.
pub fn leg_from_hop(
    snapshot: &Snapshot,
    pool_id: crate::pool::PoolId,
    token_in: &Denom,
    token_out: &Denom,
) -> Option<QuotePoolLeg> {
    let pool = snapshot.get(pool_id)?;
    Some(QuotePoolLeg {
        pool_id,
        token_in: token_in.clone(),
        token_out: token_out.clone(),
        spread_factor: pool.spread_factor,
        taker_fee: pool.taker_fee,
    })
}
