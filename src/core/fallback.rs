//! Built-in token list shown when neither the API nor the cache has data.

use crate::core::token::Token;

#[allow(clippy::too_many_arguments)]
fn token(
    address: &str,
    symbol: &str,
    name: &str,
    logo_uri: &str,
    market_cap: f64,
    volume_24h_usd: f64,
    change_24h_percent: f64,
    liquidity: f64,
    decimals: u8,
) -> Token {
    Token {
        address: address.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        logo_uri: logo_uri.to_string(),
        price: None,
        market_cap,
        volume_24h_usd,
        change_24h_percent: Some(change_24h_percent),
        change_7d_percent: None,
        liquidity,
        decimals,
        last_trade_unix_time: Some(1728461367),
    }
}

pub fn fallback_tokens() -> Vec<Token> {
    vec![
        token(
            "So11111111111111111111111111111111111111112",
            "SOL",
            "Wrapped SOL",
            "https://raw.githubusercontent.com/solana-labs/token-list/main/assets/mainnet/So11111111111111111111111111111111111111112/logo.png",
            83855758354.3748,
            1550049693.6705303,
            -13.211552356189152,
            2627726.920422704,
            9,
        ),
        token(
            "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "USDC",
            "USD Coin",
            "https://raw.githubusercontent.com/solana-labs/token-list/main/assets/mainnet/EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v/logo.png",
            3412874522.18,
            812440109.41,
            0.01,
            40212876.55,
            6,
        ),
        token(
            "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN",
            "JUP",
            "Jupiter",
            "https://static.jup.ag/jup/icon.png",
            1146320113.27,
            96301272.84,
            -4.82,
            11830244.02,
            6,
        ),
        token(
            "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",
            "Bonk",
            "Bonk",
            "https://arweave.net/hQiPZOsRZXGXBJd_82PhVdlM_hACsT_q6wqwf5cSY7I",
            1521733901.63,
            84190544.19,
            -7.45,
            9702213.87,
            5,
        ),
        token(
            "EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm",
            "$WIF",
            "dogwifhat",
            "https://bafkreibk3covs5ltyqxa272uodhculbr6kea6betidfwy3ajsav2vjzyum.ipfs.nftstorage.link",
            1742095128.51,
            211904577.32,
            -9.13,
            7310582.66,
            6,
        ),
    ]
}
