// src/ingest/fallback.rs
//! Built-in content served when providers give nothing: the curated Bitcoin
//! headlines used for cascade top-up, the per-topic headline templates, and
//! the hardcoded top-10 market snapshot.

use chrono::{DateTime, Duration, Utc};

use crate::ingest::PLACEHOLDER_IMAGE;
use crate::model::{MarketAsset, NewsArticle, NewsSource};
use crate::sentiment;

struct Curated {
    hours_ago: i64,
    title: &'static str,
    description: &'static str,
    /// Shorter blurb the sentiment label is computed from.
    sentiment_text: &'static str,
    content: &'static str,
    url: &'static str,
    image: &'static str,
    source: &'static str,
    source_url: &'static str,
}

const CURATED: &[Curated] = &[
    Curated {
        hours_ago: 2,
        title: "Bitcoin ETF Approval Drives Institutional Adoption to New Heights",
        description: "Major financial institutions are increasing their Bitcoin exposure following recent ETF approvals, signaling growing mainstream acceptance of cryptocurrency investments.",
        sentiment_text: "Major financial institutions are increasing their Bitcoin exposure",
        content: "The approval of Bitcoin ETFs has opened the floodgates for institutional investment, with pension funds, insurance companies, and sovereign wealth funds now allocating portions of their portfolios to Bitcoin.",
        url: "https://www.coindesk.com/markets/2024/01/10/bitcoin-etf-approval-drives-institutional-adoption/",
        image: PLACEHOLDER_IMAGE,
        source: "CoinDesk",
        source_url: "https://coindesk.com",
    },
    Curated {
        hours_ago: 4,
        title: "Bitcoin Network Hash Rate Reaches All-Time High Amid Mining Efficiency Improvements",
        description: "The Bitcoin network's hash rate has surged to unprecedented levels, demonstrating the network's growing security and miner confidence in the cryptocurrency's long-term value.",
        sentiment_text: "The Bitcoin network's hash rate has surged to unprecedented levels",
        content: "Bitcoin's hash rate has reached new all-time highs, indicating strong miner confidence and network security. This development comes as mining technology becomes more efficient and sustainable.",
        url: "https://cointelegraph.com/bitcoin-news/bitcoin-hash-rate-reaches-all-time-high/",
        image: "https://images.unsplash.com/photo-1621761191319-c6fb62004040?w=500&auto=format&fit=crop&q=60",
        source: "Cointelegraph",
        source_url: "https://cointelegraph.com",
    },
    Curated {
        hours_ago: 6,
        title: "Central Bank Digital Currency Developments Impact Bitcoin Market Dynamics",
        description: "As central banks worldwide explore digital currencies, Bitcoin continues to position itself as a decentralized alternative, with market analysts noting increased institutional interest.",
        sentiment_text: "Bitcoin continues to position itself as a decentralized alternative",
        content: "The development of central bank digital currencies (CBDCs) has created a new dynamic in the cryptocurrency space, with Bitcoin emerging as a hedge against centralized monetary systems.",
        url: "https://bitcoinmagazine.com/markets/cbdc-impact-bitcoin-market-dynamics",
        image: "https://images.unsplash.com/photo-1621504450181-5d356f61d307?w=500&auto=format&fit=crop&q=60",
        source: "Bitcoin Magazine",
        source_url: "https://bitcoinmagazine.com",
    },
    Curated {
        hours_ago: 8,
        title: "Bitcoin Lightning Network Adoption Accelerates with New Payment Solutions",
        description: "The Lightning Network is experiencing rapid growth as more businesses and individuals adopt Bitcoin for everyday transactions, reducing fees and improving scalability.",
        sentiment_text: "The Lightning Network is experiencing rapid growth",
        content: "Lightning Network adoption is accelerating globally, with new payment solutions making Bitcoin more practical for daily use. This development addresses long-standing scalability concerns.",
        url: "https://decrypt.co/bitcoin-lightning-network-adoption-accelerates",
        image: "https://images.unsplash.com/photo-1639762681485-074b7f938ba0?w=500&auto=format&fit=crop&q=60",
        source: "Decrypt",
        source_url: "https://decrypt.co",
    },
    Curated {
        hours_ago: 12,
        title: "Regulatory Clarity Boosts Bitcoin Adoption in Emerging Markets",
        description: "Clear regulatory frameworks in several emerging economies are driving increased Bitcoin adoption, with governments recognizing the potential benefits of cryptocurrency integration.",
        sentiment_text: "Clear regulatory frameworks are driving increased Bitcoin adoption",
        content: "Emerging markets are leading Bitcoin adoption as regulatory clarity improves. Countries are developing frameworks that balance innovation with consumer protection.",
        url: "https://www.coindesk.com/policy/2024/01/15/regulatory-clarity-boosts-bitcoin-adoption-emerging-markets/",
        image: "https://images.unsplash.com/photo-1559526324-4b87b5e36e44?w=500&auto=format&fit=crop&q=60",
        source: "CoinDesk",
        source_url: "https://coindesk.com",
    },
    Curated {
        hours_ago: 16,
        title: "Bitcoin's Environmental Impact: Mining Industry Shifts to Renewable Energy",
        description: "The Bitcoin mining industry is increasingly adopting renewable energy sources, addressing environmental concerns and improving the network's sustainability profile.",
        sentiment_text: "The Bitcoin mining industry is increasingly adopting renewable energy sources",
        content: "Bitcoin mining operations worldwide are transitioning to renewable energy sources, significantly reducing the network's carbon footprint and addressing environmental sustainability concerns.",
        url: "https://cointelegraph.com/bitcoin-news/bitcoin-mining-renewable-energy-sustainability/",
        image: "https://images.unsplash.com/photo-1466611653911-95081537e5b7?w=500&auto=format&fit=crop&q=60",
        source: "Cointelegraph",
        source_url: "https://cointelegraph.com",
    },
];

/// Curated headlines, newest first, `publishedAt` shifted back from `now`.
pub fn curated_news(now: DateTime<Utc>) -> Vec<NewsArticle> {
    CURATED
        .iter()
        .map(|c| NewsArticle {
            title: c.title.to_string(),
            description: c.description.to_string(),
            content: c.content.to_string(),
            url: c.url.to_string(),
            image_url: c.image.to_string(),
            published_at: now - Duration::hours(c.hours_ago),
            source: NewsSource {
                name: c.source.to_string(),
                url: c.source_url.to_string(),
            },
            sentiment: sentiment::classify(c.title, Some(c.sentiment_text)),
        })
        .collect()
}

/// Three headline templates (rising / collapse warning / stable) for topics
/// that have no live feed.
pub fn templated_news(topic_name: &str, topic_symbol: &str, now: DateTime<Utc>) -> Vec<NewsArticle> {
    let n = topic_name;
    let slug = topic_symbol.to_ascii_lowercase();
    let rows: [(String, String, String, &str, &str); 3] = [
        (
            format!("{n} tăng giá mạnh, nhà đầu tư lạc quan"),
            format!("Giá {n} đã tăng 15% trong tuần qua, các chuyên gia dự đoán xu hướng tích cực sẽ tiếp tục."),
            format!("Giá {n} đã tăng 15% trong tuần qua, các chuyên gia dự đoán xu hướng tích cực sẽ tiếp tục. Nhiều nhà đầu tư đang tích cực mua vào."),
            "CryptoNews",
            PLACEHOLDER_IMAGE,
        ),
        (
            format!("Các nhà phân tích cảnh báo về sự sụp đổ của {n}"),
            format!("Một số chuyên gia cảnh báo về nguy cơ giảm giá của {n} trong tháng tới."),
            format!("Một số chuyên gia cảnh báo về nguy cơ giảm giá của {n} trong tháng tới. Các yếu tố vĩ mô có thể ảnh hưởng tiêu cực đến thị trường."),
            "CryptoAnalysis",
            "https://images.unsplash.com/photo-1621761191319-c6fb62004040?w=500&auto=format&fit=crop&q=60",
        ),
        (
            format!("{n} ổn định trong bối cảnh thị trường biến động"),
            format!("Giá {n} duy trì ổn định trong khi các đồng tiền khác biến động mạnh."),
            format!("Giá {n} duy trì ổn định trong khi các đồng tiền khác biến động mạnh. Điều này cho thấy sự tin tưởng của nhà đầu tư vào đồng tiền này."),
            "CryptoDaily",
            "https://images.unsplash.com/photo-1621504450181-5d356f61d307?w=500&auto=format&fit=crop&q=60",
        ),
    ];

    rows.into_iter()
        .enumerate()
        .map(|(i, (title, description, content, source, image))| {
            let url = format!("#{slug}-{}", i + 1);
            NewsArticle {
                sentiment: sentiment::classify(&title, Some(&description)),
                title,
                description,
                content,
                url: url.clone(),
                image_url: image.to_string(),
                published_at: now,
                source: NewsSource {
                    name: source.to_string(),
                    url,
                },
            }
        })
        .collect()
}

struct Snapshot {
    id: &'static str,
    name: &'static str,
    symbol: &'static str,
    price: f64,
    change_24h: f64,
    volume_24h: f64,
    market_cap: f64,
    image: &'static str,
}

const MARKET: &[Snapshot] = &[
    Snapshot { id: "bitcoin", name: "Bitcoin", symbol: "BTC", price: 43250.67, change_24h: 2.34, volume_24h: 28_500_000_000.0, market_cap: 850_000_000_000.0, image: "https://assets.coingecko.com/coins/images/1/large/bitcoin.png" },
    Snapshot { id: "ethereum", name: "Ethereum", symbol: "ETH", price: 2650.45, change_24h: 1.87, volume_24h: 15_200_000_000.0, market_cap: 320_000_000_000.0, image: "https://assets.coingecko.com/coins/images/279/large/ethereum.png" },
    Snapshot { id: "tether", name: "Tether", symbol: "USDT", price: 1.0001, change_24h: 0.01, volume_24h: 45_000_000_000.0, market_cap: 95_000_000_000.0, image: "https://assets.coingecko.com/coins/images/325/large/Tether.png" },
    Snapshot { id: "binancecoin", name: "BNB", symbol: "BNB", price: 315.78, change_24h: -0.45, volume_24h: 1_200_000_000.0, market_cap: 48_000_000_000.0, image: "https://assets.coingecko.com/coins/images/825/large/bnb-icon2_2x.png" },
    Snapshot { id: "solana", name: "Solana", symbol: "SOL", price: 98.45, change_24h: 4.23, volume_24h: 2_800_000_000.0, market_cap: 42_000_000_000.0, image: "https://assets.coingecko.com/coins/images/4128/large/solana.png" },
    Snapshot { id: "xrp", name: "XRP", symbol: "XRP", price: 0.6234, change_24h: -1.23, volume_24h: 1_800_000_000.0, market_cap: 35_000_000_000.0, image: "https://assets.coingecko.com/coins/images/44/large/xrp-symbol-white-128.png" },
    Snapshot { id: "usd-coin", name: "USD Coin", symbol: "USDC", price: 1.0002, change_24h: 0.02, volume_24h: 8_500_000_000.0, market_cap: 28_000_000_000.0, image: "https://assets.coingecko.com/coins/images/6319/large/USD_Coin_icon.png" },
    Snapshot { id: "staked-ether", name: "Lido Staked Ether", symbol: "STETH", price: 2648.90, change_24h: 1.89, volume_24h: 450_000_000.0, market_cap: 25_000_000_000.0, image: "https://assets.coingecko.com/coins/images/13442/large/steth_logo.png" },
    Snapshot { id: "cardano", name: "Cardano", symbol: "ADA", price: 0.4856, change_24h: 3.12, volume_24h: 1_200_000_000.0, market_cap: 17_000_000_000.0, image: "https://assets.coingecko.com/coins/images/975/large/cardano.png" },
    Snapshot { id: "avalanche-2", name: "Avalanche", symbol: "AVAX", price: 36.78, change_24h: -2.15, volume_24h: 850_000_000.0, market_cap: 14_000_000_000.0, image: "https://assets.coingecko.com/coins/images/12559/large/Avalanche_Circle_RedWhite_Trans.png" },
];

/// Hardcoded top-10 snapshot, ranks 1..=10, stamped `now`. No jitter here.
pub fn market_snapshot(now: DateTime<Utc>) -> Vec<MarketAsset> {
    MARKET
        .iter()
        .enumerate()
        .map(|(i, s)| MarketAsset {
            id: s.id.to_string(),
            name: s.name.to_string(),
            symbol: s.symbol.to_string(),
            price: s.price,
            change_24h: s.change_24h,
            volume_24h: s.volume_24h,
            market_cap: s.market_cap,
            rank: i as u32 + 1,
            image_url: Some(s.image.to_string()),
            last_updated: now,
        })
        .collect()
}
