//! Bindings for the pawning shop contract.
//!
//! Only the events the listener consumes and the `pawns` read call are
//! declared here.

// Generated bindings use the Solidity parameter names.
#![allow(non_snake_case)]

use alloy::sol;

sol! {
    #[sol(rpc, all_derives)]
    interface PawningShop {
        event PawnCreated(uint256 indexed pawnId, address indexed creator);
        event PawnCancelled(uint256 indexed pawnId, address indexed borrower);
        event PawnRepaid(uint256 indexed pawnId, uint256 indexed bidId, address lender, address borrower);
        event PawnLiquidated(uint256 indexed pawnId, uint256 indexed bidId, address lender, address borrower);

        event BidCreated(uint256 indexed bidId, uint256 indexed pawnId, address creator);
        event BidCancelled(uint256 indexed bidId, uint256 indexed pawnId);
        event BidAccepted(uint256 indexed bidId, uint256 indexed pawnId, address lender, address borrower);

        event WhiteListAdded(address indexed smartContract);
        event WhiteListRemoved(address indexed smartContract);

        function pawns(uint256 pawnId)
            external
            view
            returns (address creator, address contractAddress, uint256 tokenId, uint8 status);
    }
}
