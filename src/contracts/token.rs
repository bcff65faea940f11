use ethers::prelude::*;

// cUSD (ERC20) ABI, only the allowance grant used before paying for a ride
abigen!(
    IERC20,
    r#"[
        function approve(address spender, uint256 amount) external returns (bool)
    ]"#
);
