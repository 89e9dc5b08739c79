//! Scenario tests for the long token vault

#[cfg(test)]
mod tests {
    use odra::casper_types::{U256, U512};
    use odra::host::{Deployer, HostEnv, HostRef, NoArgs};
    use odra::prelude::*;
    use crate::errors::TokenError;
    use crate::market::errors::MarketError;
    use crate::market::exchange::{PerpExchange, PerpExchangeHostRef, PerpExchangeInitArgs};
    use crate::math::Signed;
    use crate::token::{
        SettlementToken, SettlementTokenHostRef, SettlementTokenInitArgs, WrappedNative,
        WrappedNativeHostRef,
    };
    use crate::vault::errors::VaultError;
    use crate::vault::long_token::{LongToken, LongTokenHostRef, LongTokenInitArgs};

    fn eth(n: u64) -> U256 {
        U256::from(n) * U256::from(10u128.pow(18))
    }

    fn wei(n: u128) -> U256 {
        U256::from(n)
    }

    struct Fixture {
        env: HostEnv,
        weth: SettlementTokenHostRef,
        exchange: PerpExchangeHostRef,
        long_token: LongTokenHostRef,
    }

    fn setup() -> Fixture {
        let env = odra_test::env();
        let weth = SettlementToken::deploy(
            &env,
            SettlementTokenInitArgs {
                name: String::from("Test WETH"),
                symbol: String::from("WETH"),
                decimals: 18,
            },
        );
        let exchange = PerpExchange::deploy(
            &env,
            PerpExchangeInitArgs {
                settlement_token: Some(weth.address()),
                market_symbol: String::from("USD"),
            },
        );
        let long_token = LongToken::deploy(
            &env,
            LongTokenInitArgs {
                exchange: exchange.address(),
                native_wrapper: None,
            },
        );
        Fixture {
            env,
            weth,
            exchange,
            long_token,
        }
    }

    fn init_pool(fixture: &mut Fixture, base: U256, quote: U256) {
        fixture.env.set_caller(fixture.env.get_account(0));
        fixture.exchange.set_is_market_allowed(true);
        fixture.exchange.add_liquidity(base, quote);
    }

    /// Mint WETH to an account and leave it as the current caller with the
    /// vault approved for spending
    fn fund(fixture: &mut Fixture, who: Address, amount: U256) {
        fixture.env.set_caller(fixture.env.get_account(0));
        fixture.weth.mint(who, amount);
        fixture.env.set_caller(who);
        fixture.weth.approve(fixture.long_token.address(), U256::MAX);
    }

    #[test]
    fn metadata_and_asset() {
        let fixture = setup();
        assert_eq!(fixture.long_token.name(), "Perp Long USDWETH");
        assert_eq!(fixture.long_token.symbol(), "plUSDWETH");
        assert_eq!(fixture.long_token.decimals(), 18);
        assert_eq!(fixture.long_token.asset(), fixture.weth.address());
        assert_eq!(fixture.long_token.exchange(), fixture.exchange.address());
        assert_eq!(fixture.long_token.total_supply(), U256::zero());
    }

    #[test]
    fn vault_decimals_follow_market_not_settlement_token() {
        let env = odra_test::env();
        let usdc = SettlementToken::deploy(
            &env,
            SettlementTokenInitArgs {
                name: String::from("Test USDC"),
                symbol: String::from("USDC"),
                decimals: 6,
            },
        );
        let exchange = PerpExchange::deploy(
            &env,
            PerpExchangeInitArgs {
                settlement_token: Some(usdc.address()),
                market_symbol: String::from("USD"),
            },
        );
        let long_token = LongToken::deploy(
            &env,
            LongTokenInitArgs {
                exchange: exchange.address(),
                native_wrapper: None,
            },
        );
        assert_eq!(long_token.decimals(), 18);
    }

    #[test]
    fn total_assets_clamps_negative_collateral() {
        let mut fixture = setup();
        let vault = fixture.long_token.address();

        assert_eq!(fixture.long_token.total_assets(), U256::zero());

        fixture.env.set_caller(fixture.env.get_account(0));
        fixture
            .exchange
            .set_collateral_balance(vault, Signed::plus(eth(10)));
        assert_eq!(fixture.long_token.total_assets(), eth(10));

        fixture
            .exchange
            .set_collateral_balance(vault, Signed::minus(eth(10)));
        assert_eq!(fixture.long_token.total_assets(), U256::zero());
    }

    #[test]
    fn convert_to_shares_bootstrap_uses_mark_price() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));

        // balanced pool converts one to one
        assert_eq!(fixture.long_token.convert_to_shares(eth(5)), eth(5));
        assert_eq!(fixture.long_token.convert_to_assets(eth(5)), eth(5));
    }

    #[test]
    fn convert_to_shares_bootstrap_unbalanced_pool() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(20_000));

        // mark price 2: twice the quote buys half the base
        assert_eq!(
            fixture.long_token.convert_to_shares(eth(5)),
            wei(2_500_000_000_000_000_000)
        );
        assert_eq!(fixture.long_token.convert_to_assets(eth(5)), eth(10));
    }

    #[test]
    fn convert_to_shares_empty_pool_propagates_market_error() {
        let fixture = setup();
        assert_eq!(
            fixture.long_token.try_convert_to_shares(eth(5)).unwrap_err(),
            MarketError::DivisionByZero.into()
        );
    }

    #[test]
    fn convert_to_shares_ratio_after_supply_exists() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(20));
        fixture.long_token.deposit(eth(20), alice);

        let supply = fixture.long_token.total_supply();
        let total_assets = fixture.long_token.total_assets();
        let expected = eth(7) * supply / total_assets;
        assert_eq!(fixture.long_token.convert_to_shares(eth(7)), expected);
    }

    #[test]
    fn max_deposit_bounds() {
        let mut fixture = setup();

        // market not allowed
        assert_eq!(
            fixture.long_token.max_deposit(fixture.env.get_account(1)),
            U256::zero()
        );

        // allowed but empty pool
        fixture.env.set_caller(fixture.env.get_account(0));
        fixture.exchange.set_is_market_allowed(true);
        assert_eq!(
            fixture.long_token.max_deposit(fixture.env.get_account(1)),
            U256::zero()
        );

        fixture.exchange.add_liquidity(eth(10_000), eth(10_000));
        assert_eq!(
            fixture.long_token.max_deposit(fixture.env.get_account(1)),
            wei(246_950_000_000_000_000_000)
        );
        assert!(fixture.long_token.max_mint(fixture.env.get_account(1)) > U256::zero());
    }

    #[test]
    fn preview_deposit_ignores_price_band() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10), eth(10));

        // far beyond maxDeposit, still quotes the curve
        assert_eq!(
            fixture.long_token.preview_deposit(eth(100)),
            wei(9_090_909_090_909_090_909)
        );
        assert_eq!(fixture.long_token.preview_deposit(U256::zero()), U256::zero());
    }

    #[test]
    fn deposit_succeeds_and_matches_preview() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(50));

        let preview = fixture.long_token.preview_deposit(eth(20));
        let shares = fixture.long_token.deposit(eth(20), alice);

        assert_eq!(shares, wei(19_960_079_840_319_361_277));
        assert_eq!(preview, shares);
        assert_eq!(fixture.long_token.total_supply(), shares);
        assert_eq!(fixture.long_token.balance_of(alice), shares);
        assert_eq!(
            fixture.long_token.total_assets(),
            wei(20_039_999_999_999_999_999)
        );
        assert_eq!(fixture.weth.balance_of(alice), eth(30));
    }

    #[test]
    fn deposit_moves_supply_and_assets_together() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(50));

        let supply_before = fixture.long_token.total_supply();
        let assets_before = fixture.long_token.total_assets();
        fixture.long_token.deposit(eth(20), alice);
        assert!(fixture.long_token.total_supply() > supply_before);
        assert!(fixture.long_token.total_assets() > assets_before);
    }

    #[test]
    fn deposit_rejects_zero_and_over_max() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(1), eth(1));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(100));

        assert_eq!(
            fixture
                .long_token
                .try_deposit(U256::zero(), alice)
                .unwrap_err(),
            VaultError::DepositIsZero.into()
        );
        // a (1, 1) pool cannot absorb a 10 WETH buy inside the price band
        assert_eq!(
            fixture.long_token.try_deposit(eth(10), alice).unwrap_err(),
            VaultError::DepositMoreThanMax.into()
        );
    }

    #[test]
    fn deposit_rejects_insufficient_balance() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(5));

        assert_eq!(
            fixture.long_token.try_deposit(eth(10), alice).unwrap_err(),
            TokenError::InsufficientBalance.into()
        );
    }

    #[test]
    fn preview_mint_rounds_required_assets_up() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));

        assert_eq!(
            fixture.long_token.preview_mint(eth(10)),
            wei(10_010_010_010_010_010_011)
        );
        assert_eq!(fixture.long_token.preview_mint(U256::zero()), U256::zero());
    }

    #[test]
    fn mint_succeeds_with_exact_shares() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(50));

        let assets = fixture.long_token.mint(eth(20), alice);

        assert_eq!(assets, wei(20_040_080_160_320_641_283));
        assert_eq!(fixture.long_token.total_supply(), eth(20));
        assert_eq!(fixture.long_token.balance_of(alice), eth(20));
        assert_eq!(
            fixture.long_token.total_assets(),
            wei(20_080_240_641_603_848_980)
        );
        assert_eq!(
            fixture.weth.balance_of(alice),
            eth(50) - wei(20_040_080_160_320_641_283)
        );
    }

    #[test]
    fn mint_rejects_zero_and_over_max() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(1), eth(1));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(100));

        assert_eq!(
            fixture.long_token.try_mint(U256::zero(), alice).unwrap_err(),
            VaultError::MintIsZero.into()
        );
        assert_eq!(
            fixture.long_token.try_mint(eth(10), alice).unwrap_err(),
            VaultError::MintMoreThanMax.into()
        );
    }

    #[test]
    fn max_withdraw_is_owner_value_capped_by_pool() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(100), eth(100));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(1));
        fixture.long_token.deposit(eth(1), alice);

        assert_eq!(
            fixture.long_token.max_withdraw(alice),
            wei(1_009_999_999_999_999_999)
        );
    }

    #[test]
    fn max_redeem_is_owner_balance_capped_by_pool() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(10));
        fixture.long_token.deposit(eth(10), alice);

        assert_eq!(
            fixture.long_token.max_redeem(alice),
            wei(9_990_009_990_009_990_009)
        );
    }

    #[test]
    fn max_bounds_zero_when_market_disallowed() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(10));
        fixture.long_token.deposit(eth(10), alice);

        fixture.env.set_caller(fixture.env.get_account(0));
        fixture.exchange.set_is_market_allowed(false);

        assert_eq!(fixture.long_token.max_deposit(alice), U256::zero());
        assert_eq!(fixture.long_token.max_mint(alice), U256::zero());
        assert_eq!(fixture.long_token.max_withdraw(alice), U256::zero());
        assert_eq!(fixture.long_token.max_redeem(alice), U256::zero());

        fixture.env.set_caller(alice);
        assert_eq!(
            fixture.long_token.try_deposit(eth(1), alice).unwrap_err(),
            VaultError::DepositMoreThanMax.into()
        );
        assert_eq!(
            fixture
                .long_token
                .try_redeem(wei(1), alice, alice)
                .unwrap_err(),
            VaultError::RedeemMoreThanMax.into()
        );
    }

    #[test]
    fn preview_withdraw_rounds_burned_shares_up() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(10));
        fixture.long_token.deposit(eth(10), alice);

        assert_eq!(
            fixture.long_token.preview_withdraw(eth(5)),
            wei(4_992_508_740_634_677_667)
        );
        assert_eq!(fixture.long_token.preview_withdraw(U256::zero()), U256::zero());
    }

    #[test]
    fn withdraw_succeeds() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(10));
        fixture.long_token.deposit(eth(10), alice);

        let supply_before = fixture.long_token.total_supply();
        let assets_before = fixture.long_token.total_assets();
        let shares = fixture.long_token.withdraw(eth(5), alice, alice);

        assert_eq!(shares, wei(4_992_508_740_634_677_667));
        assert_eq!(
            fixture.long_token.total_supply(),
            supply_before - shares
        );
        assert_eq!(
            fixture.long_token.balance_of(alice),
            supply_before - shares
        );
        assert_eq!(fixture.weth.balance_of(alice), eth(5));
        assert!(fixture.long_token.total_assets() < assets_before);
    }

    #[test]
    fn withdraw_rejects_zero_and_over_max() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(10));
        fixture.long_token.deposit(eth(10), alice);

        assert_eq!(
            fixture
                .long_token
                .try_withdraw(U256::zero(), alice, alice)
                .unwrap_err(),
            VaultError::WithdrawIsZero.into()
        );
        assert_eq!(
            fixture
                .long_token
                .try_withdraw(eth(20), alice, alice)
                .unwrap_err(),
            VaultError::WithdrawMoreThanMax.into()
        );
    }

    #[test]
    fn withdraw_for_owner_spends_allowance() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        let bob = fixture.env.get_account(2);
        fund(&mut fixture, alice, eth(10));
        fixture.long_token.deposit(eth(10), alice);

        // no allowance yet
        fixture.env.set_caller(bob);
        assert_eq!(
            fixture
                .long_token
                .try_withdraw(eth(2), bob, alice)
                .unwrap_err(),
            TokenError::InsufficientAllowance.into()
        );

        fixture.env.set_caller(alice);
        fixture.long_token.approve(bob, eth(5));

        fixture.env.set_caller(bob);
        let burned = fixture.long_token.withdraw(eth(2), bob, alice);
        assert_eq!(burned, wei(1_996_404_874_102_715_830));
        assert_eq!(
            fixture.long_token.allowance(alice, bob),
            eth(5) - burned
        );
        assert_eq!(fixture.weth.balance_of(bob), eth(2));
    }

    #[test]
    fn withdraw_for_owner_keeps_unlimited_allowance() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        let bob = fixture.env.get_account(2);
        fund(&mut fixture, alice, eth(10));
        fixture.long_token.deposit(eth(10), alice);

        fixture.env.set_caller(alice);
        fixture.long_token.approve(bob, U256::MAX);

        fixture.env.set_caller(bob);
        fixture.long_token.withdraw(eth(2), bob, alice);
        assert_eq!(fixture.long_token.allowance(alice, bob), U256::MAX);
    }

    #[test]
    fn preview_redeem_rounds_assets_down() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(10));
        fixture.long_token.deposit(eth(10), alice);

        assert_eq!(
            fixture
                .long_token
                .preview_redeem(wei(4_992_508_740_634_677_667)),
            eth(5)
        );
        assert_eq!(fixture.long_token.preview_redeem(U256::zero()), U256::zero());
    }

    #[test]
    fn redeem_succeeds() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(10));
        fixture.long_token.deposit(eth(10), alice);

        let supply_before = fixture.long_token.total_supply();
        let assets = fixture
            .long_token
            .redeem(wei(4_992_508_740_634_677_667), alice, alice);

        assert_eq!(assets, eth(5));
        assert_eq!(
            fixture.long_token.total_supply(),
            supply_before - wei(4_992_508_740_634_677_667)
        );
        assert_eq!(fixture.weth.balance_of(alice), eth(5));
    }

    #[test]
    fn redeem_rejects_zero_and_over_max() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(10));
        fixture.long_token.deposit(eth(10), alice);

        assert_eq!(
            fixture
                .long_token
                .try_redeem(U256::zero(), alice, alice)
                .unwrap_err(),
            VaultError::RedeemIsZero.into()
        );
        assert_eq!(
            fixture
                .long_token
                .try_redeem(eth(20), alice, alice)
                .unwrap_err(),
            VaultError::RedeemMoreThanMax.into()
        );
    }

    #[test]
    fn deposit_half_balance_end_to_end() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        fund(&mut fixture, alice, eth(100));

        let shares = fixture.long_token.deposit(eth(50), alice);

        assert_eq!(shares, wei(49_751_243_781_094_527_363));
        assert_eq!(fixture.weth.balance_of(alice), eth(50));
        // the position is marked at the post-trade pool price
        assert_eq!(
            fixture.long_token.total_assets(),
            wei(50_249_999_999_999_999_999)
        );
    }

    #[test]
    fn two_depositors_each_get_their_realized_shares() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        let bob = fixture.env.get_account(2);

        fund(&mut fixture, alice, eth(20));
        fixture.long_token.deposit(eth(20), alice);

        fund(&mut fixture, bob, eth(30));
        fixture.long_token.deposit(eth(30), bob);

        let alice_shares = wei(19_960_079_840_319_361_277);
        let bob_shares = wei(29_791_163_940_775_166_085);
        assert_eq!(fixture.long_token.balance_of(alice), alice_shares);
        assert_eq!(fixture.long_token.balance_of(bob), bob_shares);
        assert_eq!(
            fixture.long_token.total_supply(),
            alice_shares + bob_shares
        );
    }

    #[test]
    fn native_entry_points_rejected_under_token_settlement() {
        let mut fixture = setup();
        init_pool(&mut fixture, eth(10_000), eth(10_000));
        let alice = fixture.env.get_account(1);
        fixture.env.set_caller(alice);

        assert_eq!(
            fixture.long_token.try_deposit_native(alice).unwrap_err(),
            VaultError::NativeNotAvailable.into()
        );
        assert_eq!(
            fixture
                .long_token
                .try_mint_native(eth(1), alice)
                .unwrap_err(),
            VaultError::NativeNotAvailable.into()
        );
        assert_eq!(
            fixture
                .long_token
                .try_withdraw_native(eth(1), alice, alice)
                .unwrap_err(),
            VaultError::NativeNotAvailable.into()
        );
        assert_eq!(
            fixture
                .long_token
                .try_redeem_native(eth(1), alice, alice)
                .unwrap_err(),
            VaultError::NativeNotAvailable.into()
        );
    }

    // ============ Native Settlement ============

    struct NativeFixture {
        env: HostEnv,
        wrapper: WrappedNativeHostRef,
        exchange: PerpExchangeHostRef,
        long_token: LongTokenHostRef,
    }

    /// Amounts in the native fixture are motes (9 decimals): a pool of
    /// 1e12 and deposits around 1e9 keep well inside test account balances
    fn setup_native() -> NativeFixture {
        let env = odra_test::env();
        let wrapper = WrappedNative::deploy(&env, NoArgs);
        let exchange = PerpExchange::deploy(
            &env,
            PerpExchangeInitArgs {
                settlement_token: None,
                market_symbol: String::from("USD"),
            },
        );
        let long_token = LongToken::deploy(
            &env,
            LongTokenInitArgs {
                exchange: exchange.address(),
                native_wrapper: Some(wrapper.address()),
            },
        );
        NativeFixture {
            env,
            wrapper,
            exchange,
            long_token,
        }
    }

    fn init_native_pool(fixture: &mut NativeFixture) {
        fixture.env.set_caller(fixture.env.get_account(0));
        fixture.exchange.set_is_market_allowed(true);
        fixture
            .exchange
            .add_liquidity(wei(1_000_000_000_000), wei(1_000_000_000_000));
    }

    #[test]
    fn native_metadata() {
        let fixture = setup_native();
        assert_eq!(fixture.long_token.name(), "Perp Long USDCSPR");
        assert_eq!(fixture.long_token.symbol(), "plUSDCSPR");
        assert_eq!(fixture.long_token.asset(), fixture.wrapper.address());
    }

    #[test]
    fn token_entry_points_rejected_under_native_settlement() {
        let mut fixture = setup_native();
        init_native_pool(&mut fixture);
        let alice = fixture.env.get_account(1);
        fixture.env.set_caller(alice);

        assert_eq!(
            fixture
                .long_token
                .try_deposit(wei(1_000_000_000), alice)
                .unwrap_err(),
            VaultError::TokenNotAvailable.into()
        );
        assert_eq!(
            fixture
                .long_token
                .try_redeem(wei(1_000_000_000), alice, alice)
                .unwrap_err(),
            VaultError::TokenNotAvailable.into()
        );
    }

    #[test]
    fn deposit_native_mints_realized_shares() {
        let mut fixture = setup_native();
        init_native_pool(&mut fixture);
        let alice = fixture.env.get_account(1);

        fixture.env.set_caller(alice);
        let shares = fixture
            .long_token
            .with_tokens(U512::from(2_000_000_000u64))
            .deposit_native(alice);

        assert_eq!(shares, wei(1_996_007_984));
        assert_eq!(fixture.long_token.balance_of(alice), shares);
        assert_eq!(fixture.long_token.total_assets(), wei(2_003_999_999));
    }

    #[test]
    fn deposit_native_rejects_zero_value() {
        let mut fixture = setup_native();
        init_native_pool(&mut fixture);
        let alice = fixture.env.get_account(1);
        fixture.env.set_caller(alice);

        assert_eq!(
            fixture.long_token.try_deposit_native(alice).unwrap_err(),
            VaultError::DepositIsZero.into()
        );
    }

    #[test]
    fn withdraw_native_pays_the_receiver() {
        let mut fixture = setup_native();
        init_native_pool(&mut fixture);
        let alice = fixture.env.get_account(1);
        let bob = fixture.env.get_account(2);

        fixture.env.set_caller(alice);
        fixture
            .long_token
            .with_tokens(U512::from(2_000_000_000u64))
            .deposit_native(alice);

        let bob_before = fixture.env.balance_of(&bob);
        let shares_before = fixture.long_token.balance_of(alice);
        let burned = fixture
            .long_token
            .withdraw_native(wei(1_000_000_000), bob, alice);

        assert_eq!(burned, wei(997_006_986));
        assert_eq!(
            fixture.long_token.balance_of(alice),
            shares_before - burned
        );
        assert_eq!(
            fixture.env.balance_of(&bob),
            bob_before + U512::from(1_000_000_000u64)
        );
    }

    #[test]
    fn mint_native_refunds_surplus() {
        let mut fixture = setup_native();
        init_native_pool(&mut fixture);
        let alice = fixture.env.get_account(1);

        fixture.env.set_caller(alice);
        let alice_before = fixture.env.balance_of(&alice);
        let assets = fixture
            .long_token
            .with_tokens(U512::from(3_000_000_000u64))
            .mint_native(wei(1_000_000_000), alice);

        assert_eq!(assets, wei(1_001_001_002));
        assert_eq!(fixture.long_token.balance_of(alice), wei(1_000_000_000));
        // only the required assets leave the caller, the rest is refunded
        assert_eq!(
            fixture.env.balance_of(&alice),
            alice_before - U512::from(1_001_001_002u64)
        );
    }

    #[test]
    fn mint_native_rejects_insufficient_value() {
        let mut fixture = setup_native();
        init_native_pool(&mut fixture);
        let alice = fixture.env.get_account(1);

        fixture.env.set_caller(alice);
        assert_eq!(
            fixture
                .long_token
                .with_tokens(U512::from(1_000u64))
                .try_mint_native(wei(1_000_000_000), alice)
                .unwrap_err(),
            VaultError::InsufficientNativeValue.into()
        );
    }

    #[test]
    fn redeem_native_round_trip() {
        let mut fixture = setup_native();
        init_native_pool(&mut fixture);
        let alice = fixture.env.get_account(1);

        fixture.env.set_caller(alice);
        let shares = fixture
            .long_token
            .with_tokens(U512::from(2_000_000_000u64))
            .deposit_native(alice);

        let assets = fixture.long_token.redeem_native(shares, alice, alice);
        // a full round trip loses only rounding dust to the pool
        assert_eq!(assets, wei(1_999_999_999));
        assert_eq!(fixture.long_token.total_supply(), U256::zero());
        assert_eq!(fixture.long_token.balance_of(alice), U256::zero());
    }
}
