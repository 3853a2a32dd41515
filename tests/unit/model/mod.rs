mod geo;
mod order;
