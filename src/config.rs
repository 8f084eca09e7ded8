use clap::Parser;

#[derive(Parser, Clone)]
pub struct Config {
    #[clap(env, long, default_value = "localhost")]
    pub postgres_host: String,

    #[clap(env, long)]
    pub postgres_user: String,

    #[clap(env, long)]
    pub postgres_password: String,

    #[clap(env, long)]
    pub postgres_database: String,

    #[clap(env, long, default_value_t = 4)]
    pub max_pool_size: u32,

    /// Name fragment to search for; empty matches every restaurant.
    #[clap(long, default_value = "")]
    pub query: String,

    /// Minimum star rating a match must carry.
    #[clap(long, default_value_t = 0.0)]
    pub minimum_stars: f64,
}

impl Config {
    pub fn postgres_connection_string(&self) -> String {
        format!(
            "host={} user={} password={} dbname={}",
            self.postgres_host, self.postgres_user, self.postgres_password, self.postgres_database,
        )
    }
}
