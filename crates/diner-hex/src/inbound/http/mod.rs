mod server;

pub use server::{
    CreateOrderRequest, HttpServer, HttpServerConfig, OrderResponse, UpdateStatusRequest,
};
