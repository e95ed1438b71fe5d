pub mod effective_cost;
