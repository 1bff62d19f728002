pub mod test_offer_flow;
