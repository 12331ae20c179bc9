//! End-to-end walkthrough: install a small pool set, ask for an optimal
//! quote, then invert it into an exact-out quote.

use amm_router::simulator::test_support::ConstantProductSimulator;
use amm_router::{Denom, DenomCoin, Pool, PoolId, PoolKind, Router, RouterConfig, RouterOptions, SwapState};
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;

fn pool(id: u64, kind: PoolKind, reserves: &[(&str, u128)]) -> Pool {
    let mut map = HashMap::new();
    for (denom, reserve) in reserves {
        map.insert(Denom::from(*denom), *reserve);
    }
    Pool {
        id: PoolId(id),
        kind,
        denoms: reserves.iter().map(|(d, _)| Denom::from(*d)).collect(),
        liquidity_cap: reserves.iter().map(|(_, r)| *r as u64).min().unwrap_or(0),
        liquidity_cap_error_empty: false,
        spread_factor: dec!(0.003),
        taker_fee: dec!(0.0),
        swap_state: SwapState(Vec::new()),
        reserves: Some(map),
        code_id: None,
        is_canonical_orderbook: false,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let atom = Denom::from("atom");
    let usdc = Denom::from("usdc");

    let simulator = ConstantProductSimulator::new()
        .with_pool_reserves(PoolId(1), (atom.clone(), 1_000_000), (usdc.clone(), 8_000_000))
        .with_pool_reserves(PoolId(2), (atom.clone(), 2_000_000), (usdc.clone(), 16_000_000));

    let router = Router::new(Arc::new(simulator), RouterConfig::default());
    router.replace_pools(vec![
        pool(1, PoolKind::Balancer, &[("atom", 1_000_000), ("usdc", 8_000_000)]),
        pool(2, PoolKind::Balancer, &[("atom", 2_000_000), ("usdc", 16_000_000)]),
    ]);

    let options = RouterOptions::default();
    let quote = router
        .get_optimal_quote(DenomCoin::new(atom.clone(), 10_000), usdc.clone(), &options, None, None)
        .await?;

    println!(
        "quoted {} atom -> {} usdc across {} route(s), effective_fee={}",
        quote.input.amount,
        quote.amount_out,
        quote.routes.len(),
        quote.effective_fee,
    );

    let inverted = router
        .get_optimal_quote_in_given_out(DenomCoin::new(usdc, quote.amount_out), atom, &options, None, None)
        .await?;
    println!("inverted: need {} atom to receive {} usdc", inverted.amount_out, inverted.input.amount);

    Ok(())
}
