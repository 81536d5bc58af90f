//! Typed API client
//!
//! One method per server endpoint. Sign-in stores the issued token in the
//! [`SessionService`] and attaches it to every later request.

use serde_json::Value;

use shared::models::{
    AuthResponse, Bid, CastVote, CategoryFieldWithMeta, CategorySchema, Dispute,
    DisputeMessageCreate, DisputeOutcome, DisputeResolve, Order, OrderActionRequest, OrderCreate,
    PlaceBid, Product, ProductCreate, ProductQuery, ProductUpdate, ProposalCreate, ProposalView,
    TelegramLoginPayload, User, UserUpdate, VoteChoice, WebAppAuthRequest, WishlistToggle,
};
use shared::order::OrderAction;

use crate::{ClientConfig, ClientResult, HttpClient, NetworkHttpClient, SessionService};

pub struct MarketClient<C: HttpClient = NetworkHttpClient> {
    http: C,
    session: SessionService,
}

impl MarketClient<NetworkHttpClient> {
    /// Network client; restores a saved session when `token_path` is set
    pub fn connect(config: &ClientConfig) -> ClientResult<Self> {
        let session = match &config.token_path {
            Some(path) => SessionService::open(path)?,
            None => SessionService::in_memory(),
        };
        Ok(Self::with_session(NetworkHttpClient::new(config)?, session))
    }
}

impl<C: HttpClient> MarketClient<C> {
    pub fn with_session(mut http: C, session: SessionService) -> Self {
        http.set_token(session.token().map(str::to_string));
        Self { http, session }
    }

    pub fn session(&self) -> &SessionService {
        &self.session
    }

    fn remember(&mut self, auth: &AuthResponse) -> ClientResult<()> {
        self.session.save(auth.token.clone())?;
        self.http.set_token(Some(auth.token.clone()));
        tracing::info!(user_id = auth.user.id, "Signed in");
        Ok(())
    }

    // ========== Auth ==========

    pub async fn login_telegram(&mut self, payload: &TelegramLoginPayload) -> ClientResult<AuthResponse> {
        let auth: AuthResponse = self.http.post("/api/auth/telegram", payload).await?;
        self.remember(&auth)?;
        Ok(auth)
    }

    pub async fn login_webapp(&mut self, init_data: &str) -> ClientResult<AuthResponse> {
        let request = WebAppAuthRequest {
            init_data: init_data.to_string(),
        };
        let auth: AuthResponse = self.http.post("/api/auth/webapp", &request).await?;
        self.remember(&auth)?;
        Ok(auth)
    }

    pub fn logout(&mut self) -> ClientResult<()> {
        self.http.set_token(None);
        self.session.clear()
    }

    pub async fn me(&self) -> ClientResult<User> {
        self.http.get("/api/auth/me").await
    }

    pub async fn health(&self) -> ClientResult<Value> {
        self.http.get("/health").await
    }

    // ========== Users ==========

    pub async fn user(&self, id: i64) -> ClientResult<User> {
        self.http.get(&format!("/api/users/{id}")).await
    }

    pub async fn update_profile(&self, update: &UserUpdate) -> ClientResult<User> {
        self.http.put("/api/users/me", update).await
    }

    // ========== Categories ==========

    pub async fn categories(&self) -> ClientResult<Vec<CategorySchema>> {
        self.http.get("/api/categories").await
    }

    pub async fn replace_categories(&self, tree: &[CategorySchema]) -> ClientResult<Vec<CategorySchema>> {
        self.http.put("/api/categories", &tree).await
    }

    pub async fn category_fields(&self, name: &str) -> ClientResult<Vec<CategoryFieldWithMeta>> {
        self.http
            .get(&format!("/api/categories/{}/fields", encode_segment(name)))
            .await
    }

    // ========== Products ==========

    pub async fn products(&self, query: &ProductQuery) -> ClientResult<Vec<Product>> {
        self.http.get(&products_path(query)).await
    }

    pub async fn product(&self, id: i64) -> ClientResult<Product> {
        self.http.get(&format!("/api/products/{id}")).await
    }

    pub async fn create_product(&self, payload: &ProductCreate) -> ClientResult<Product> {
        self.http.post("/api/products", payload).await
    }

    pub async fn update_product(&self, id: i64, payload: &ProductUpdate) -> ClientResult<Product> {
        self.http.put(&format!("/api/products/{id}"), payload).await
    }

    pub async fn delete_product(&self, id: i64) -> ClientResult<bool> {
        self.http.delete(&format!("/api/products/{id}")).await
    }

    pub async fn bids(&self, product_id: i64) -> ClientResult<Vec<Bid>> {
        self.http.get(&format!("/api/products/{product_id}/bids")).await
    }

    pub async fn place_bid(&self, product_id: i64, amount: f64) -> ClientResult<Bid> {
        self.http
            .post(&format!("/api/products/{product_id}/bids"), &PlaceBid { amount })
            .await
    }

    // ========== Orders ==========

    pub async fn checkout(&self, payload: &OrderCreate) -> ClientResult<Order> {
        self.http.post("/api/orders", payload).await
    }

    pub async fn purchases(&self) -> ClientResult<Vec<Order>> {
        self.http.get("/api/orders/purchases").await
    }

    pub async fn sales(&self) -> ClientResult<Vec<Order>> {
        self.http.get("/api/orders/sales").await
    }

    pub async fn order(&self, id: i64) -> ClientResult<Order> {
        self.http.get(&format!("/api/orders/{id}")).await
    }

    pub async fn order_actions(&self, id: i64) -> ClientResult<Vec<OrderAction>> {
        self.http.get(&format!("/api/orders/{id}/actions")).await
    }

    pub async fn apply_action(&self, id: i64, request: &OrderActionRequest) -> ClientResult<Order> {
        self.http.post(&format!("/api/orders/{id}/actions"), request).await
    }

    // ========== Disputes ==========

    pub async fn open_disputes(&self) -> ClientResult<Vec<Dispute>> {
        self.http.get("/api/disputes").await
    }

    pub async fn dispute(&self, id: i64) -> ClientResult<Dispute> {
        self.http.get(&format!("/api/disputes/{id}")).await
    }

    pub async fn post_dispute_message(&self, id: i64, text: &str) -> ClientResult<Dispute> {
        let body = DisputeMessageCreate {
            text: text.to_string(),
        };
        self.http.post(&format!("/api/disputes/{id}/messages"), &body).await
    }

    pub async fn resolve_dispute(&self, id: i64, outcome: DisputeOutcome) -> ClientResult<Dispute> {
        self.http
            .post(&format!("/api/disputes/{id}/resolve"), &DisputeResolve { outcome })
            .await
    }

    // ========== Proposals ==========

    pub async fn proposals(&self) -> ClientResult<Vec<ProposalView>> {
        self.http.get("/api/proposals").await
    }

    pub async fn proposal(&self, id: i64) -> ClientResult<ProposalView> {
        self.http.get(&format!("/api/proposals/{id}")).await
    }

    pub async fn create_proposal(&self, payload: &ProposalCreate) -> ClientResult<ProposalView> {
        self.http.post("/api/proposals", payload).await
    }

    pub async fn vote(&self, id: i64, choice: VoteChoice) -> ClientResult<ProposalView> {
        self.http
            .post(&format!("/api/proposals/{id}/votes"), &CastVote { choice })
            .await
    }

    pub async fn close_proposal(&self, id: i64) -> ClientResult<ProposalView> {
        self.http.post_empty(&format!("/api/proposals/{id}/close")).await
    }

    // ========== Wishlist ==========

    pub async fn wishlist(&self) -> ClientResult<Vec<i64>> {
        self.http.get("/api/wishlist").await
    }

    pub async fn toggle_wishlist(&self, product_id: i64) -> ClientResult<WishlistToggle> {
        self.http.post_empty(&format!("/api/wishlist/{product_id}")).await
    }
}

fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn products_path(query: &ProductQuery) -> String {
    let mut params = url::form_urlencoded::Serializer::new(String::new());
    if let Some(category) = &query.category {
        params.append_pair("category", category);
    }
    if let Some(seller_id) = query.seller_id {
        params.append_pair("sellerId", &seller_id.to_string());
    }
    if let Some(auctions_only) = query.auctions_only {
        params.append_pair("auctionsOnly", &auctions_only.to_string());
    }
    let params = params.finish();
    if params.is_empty() {
        "/api/products".to_string()
    } else {
        format!("/api/products?{params}")
    }
}
