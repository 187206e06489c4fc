mod test_auth_flows;
mod test_middleware;
