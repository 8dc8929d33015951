//! 请求User-Agent池
//! 每次请求随机取一个，降低被简单UA规则拦截的概率

use rand::Rng;

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

/// 从UA池中随机取一个
pub fn random_user_agent(rng: &mut impl Rng) -> &'static str {
    USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())]
}
