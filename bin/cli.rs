//! CLI tool for deploying and interacting with the perp long token contracts.

use odra::casper_types::U256;
use odra::host::HostEnv;
use odra::prelude::{Address, Addressable};
use odra::schema::casper_contract_schema::NamedCLType;
use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt,
    OdraCli,
};
use perplong_contracts::market::exchange::PerpExchange;
use perplong_contracts::token::SettlementToken;
use perplong_contracts::vault::long_token::LongToken;

/// Deploys the settlement token and the perp exchange bound to it.
pub struct ExchangeDeployScript;

impl DeployScript for ExchangeDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        use perplong_contracts::market::exchange::PerpExchangeInitArgs;
        use perplong_contracts::token::SettlementTokenInitArgs;

        let weth = SettlementToken::load_or_deploy(
            &env,
            SettlementTokenInitArgs {
                name: String::from("Wrapped Ether"),
                symbol: String::from("WETH"),
                decimals: 18,
            },
            container,
            300_000_000_000, // Gas limit for token deployment
        )?;

        let _exchange = PerpExchange::load_or_deploy(
            &env,
            PerpExchangeInitArgs {
                settlement_token: Some(weth.address().clone()),
                market_symbol: String::from("USD"),
            },
            container,
            500_000_000_000, // Gas limit for exchange deployment
        )?;

        Ok(())
    }
}

/// Deploys the long token vault.
/// Requires the exchange to be deployed first.
pub struct LongTokenDeployScript;

impl DeployScript for LongTokenDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        use perplong_contracts::vault::long_token::LongTokenInitArgs;

        // Get exchange address from container
        let exchange = container.contract_ref::<PerpExchange>(env)?;
        let exchange_address = exchange.address().clone();

        let _long_token = LongToken::load_or_deploy(
            &env,
            LongTokenInitArgs {
                exchange: exchange_address,
                native_wrapper: None,
            },
            container,
            500_000_000_000, // Gas limit for vault deployment
        )?;

        Ok(())
    }
}

/// Deploys the complete stack (settlement token + exchange + vault).
pub struct StackDeployScript;

impl DeployScript for StackDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        // Deploy token and exchange first
        ExchangeDeployScript.deploy(env, container)?;

        // Then deploy the vault
        LongTokenDeployScript.deploy(env, container)?;

        Ok(())
    }
}

/// Scenario to allow trading and seed the pool with liquidity.
pub struct InitPoolScenario;

impl Scenario for InitPoolScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new(
                "base",
                "Base reserve to seed the pool with",
                NamedCLType::U256,
            ),
            CommandArg::new(
                "quote",
                "Quote reserve to seed the pool with",
                NamedCLType::U256,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args,
    ) -> Result<(), Error> {
        let mut exchange = container.contract_ref::<PerpExchange>(env)?;
        let base = args.get_single::<U256>("base")?;
        let quote = args.get_single::<U256>("quote")?;

        env.set_gas(300_000_000_000);
        exchange.try_set_is_market_allowed(true)?;
        env.set_gas(300_000_000_000);
        exchange.try_add_liquidity(base, quote)?;

        println!("Pool initialized successfully!");
        Ok(())
    }
}

impl ScenarioMetadata for InitPoolScenario {
    const NAME: &'static str = "init-pool";
    const DESCRIPTION: &'static str = "Allows trading and seeds the pool with liquidity";
}

/// Scenario to mint settlement tokens to an account.
pub struct FaucetScenario;

impl Scenario for FaucetScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new(
                "recipient",
                "Address receiving the tokens",
                NamedCLType::Key,
            ),
            CommandArg::new("amount", "Amount to mint", NamedCLType::U256),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args,
    ) -> Result<(), Error> {
        let mut token = container.contract_ref::<SettlementToken>(env)?;
        let recipient = args.get_single::<Address>("recipient")?;
        let amount = args.get_single::<U256>("amount")?;

        env.set_gas(300_000_000_000);
        token.try_mint(recipient, amount)?;

        println!("Tokens minted successfully!");
        Ok(())
    }
}

impl ScenarioMetadata for FaucetScenario {
    const NAME: &'static str = "faucet";
    const DESCRIPTION: &'static str = "Mints settlement tokens to an account";
}

/// Main function to run the CLI tool.
pub fn main() {
    OdraCli::new()
        .about("CLI tool for the perp long token contracts")
        // Deploy scripts
        .deploy(ExchangeDeployScript)
        .deploy(LongTokenDeployScript)
        .deploy(StackDeployScript)
        // Contract references
        .contract::<SettlementToken>()
        .contract::<PerpExchange>()
        .contract::<LongToken>()
        // Scenarios
        .scenario(InitPoolScenario)
        .scenario(FaucetScenario)
        .build()
        .run();
}
