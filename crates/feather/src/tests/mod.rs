mod meta_tests;
