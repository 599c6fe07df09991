mod roundtrip_tests;
